// src/integration_tests.rs
//
// Regras de negócio contra um Postgres real. Rodam com
// `DATABASE_URL=... cargo test -- --ignored`; cada teste ganha um banco novo.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{AppState, Config},
    models::{
        empresa::{CreateEmpresaPayload, Empresa, StatusEmpresa, UpdateEmpresaPayload},
        formando::ParentePayload,
        usuario::{CreateUsuarioPayload, Papel, UpdateUsuarioPayload, Usuario},
    },
};

const SENHA: &str = "segredo123";

fn state(pool: PgPool) -> AppState {
    AppState::with_pool(Config::for_tests(), pool)
}

async fn nova_empresa(state: &AppState, nome: &str) -> (Empresa, Usuario) {
    state
        .empresa_service
        .create_with_admin(&CreateEmpresaPayload {
            nome_empresa: nome.to_string(),
            email_admin: format!("adm@{}.com", nome.to_lowercase()),
            senha_admin: SENHA.to_string(),
            max_usuarios: None,
            assinatura_ativa_ate: None,
        })
        .await
        .unwrap()
}

async fn contar(pool: &PgPool, sql: &str, empresa_id: Uuid) -> i64 {
    sqlx::query_scalar(sql).bind(empresa_id).fetch_one(pool).await.unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn login_fails_with_wrong_password(pool: PgPool) {
    let state = state(pool);
    let (_, admin) = nova_empresa(&state, "Lumen").await;

    let err = state.auth_service.login(&admin.email, "errada").await.unwrap_err();
    assert!(matches!(err, AppError::SenhaIncorreta { ref email } if *email == admin.email));

    let err = state.auth_service.login("ninguem@lumen.com", SENHA).await.unwrap_err();
    assert!(matches!(err, AppError::EmailNaoCadastrado { .. }));

    assert!(state.auth_service.login(&admin.email, SENHA).await.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn login_fails_for_inactive_company(pool: PgPool) {
    let state = state(pool);
    let (empresa, admin) = nova_empresa(&state, "Flash").await;

    state
        .empresa_service
        .update(
            empresa.id,
            &UpdateEmpresaPayload {
                nome: None,
                assinatura_ativa_ate: None,
                max_usuarios: None,
                status: Some(StatusEmpresa::Inativa),
            },
        )
        .await
        .unwrap();

    let err = state.auth_service.login(&admin.email, SENHA).await.unwrap_err();
    assert!(matches!(err, AppError::EmpresaInativa { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn other_tenants_formandos_are_not_found(pool: PgPool) {
    let state = state(pool);
    let (dona, _) = nova_empresa(&state, "Dona").await;
    let (intrusa, _) = nova_empresa(&state, "Intrusa").await;

    let aluno = state
        .turma_service
        .add_aluno(dona.id, "3A", Some("Maria"))
        .await
        .unwrap();

    let err = state.parente_service.list(intrusa.id, aluno.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = state.turma_service.delete_aluno(intrusa.id, aluno.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let detalhe = state
        .turma_service
        .detalhe(intrusa.id, "3A", Default::default())
        .await
        .unwrap();
    assert!(detalhe.alunos.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn csv_import_counts_only_complete_rows(pool: PgPool) {
    let state = state(pool.clone());
    let (empresa, _) = nova_empresa(&state, "Import").await;

    let csv = "turma,aluno\n3A,Maria\n3A,\n3B,Pedro\n";
    let inseridos = state
        .turma_service
        .importar(empresa.id, "lista.csv", csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(inseridos, 2);
    assert_eq!(
        contar(&pool, "SELECT COUNT(*) FROM formandos WHERE empresa_id = $1", empresa.id).await,
        2
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn deleting_an_empresa_cascades(pool: PgPool) {
    let state = state(pool.clone());
    let (empresa, _) = nova_empresa(&state, "Cascata").await;

    let aluno = state
        .turma_service
        .add_aluno(empresa.id, "3A", Some("Maria"))
        .await
        .unwrap();
    state
        .parente_service
        .create(
            empresa.id,
            &ParentePayload {
                formando_id: Some(aluno.id),
                grau: Some("Pai".into()),
                cidade: Some("campinas".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    state.empresa_service.delete(empresa.id).await.unwrap();

    assert_eq!(contar(&pool, "SELECT COUNT(*) FROM usuarios WHERE empresa_id = $1", empresa.id).await, 0);
    assert_eq!(contar(&pool, "SELECT COUNT(*) FROM formandos WHERE empresa_id = $1", empresa.id).await, 0);
    let parentes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parentes WHERE formando_id = $1")
        .bind(aluno.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(parentes, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn team_respects_the_user_limit(pool: PgPool) {
    let state = state(pool);
    let (empresa, _) = nova_empresa(&state, "Limite").await;

    // O ADM já ocupa uma das 5 vagas
    for i in 0..4 {
        state
            .equipe_service
            .create(
                empresa.id,
                &CreateUsuarioPayload {
                    email: format!("user{}@limite.com", i),
                    nome: format!("Usuário {}", i),
                    senha: SENHA.to_string(),
                    papel: Papel::Editor,
                },
            )
            .await
            .unwrap();
    }

    let err = state
        .equipe_service
        .create(
            empresa.id,
            &CreateUsuarioPayload {
                email: "sobrando@limite.com".into(),
                nome: "Sobrando".into(),
                senha: SENHA.to_string(),
                papel: Papel::Visualizador,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimiteUsuariosAtingido));
}

fn novo_usuario(email: String) -> CreateUsuarioPayload {
    CreateUsuarioPayload {
        nome: "Concorrente".into(),
        email,
        senha: SENHA.to_string(),
        papel: Papel::Editor,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn concurrent_signups_never_exceed_the_user_limit(pool: PgPool) {
    let state = state(pool.clone());
    let (empresa, _) = nova_empresa(&state, "Corrida").await;

    // 4 vagas livres, 8 cadastros simultâneos
    let empresa_id = empresa.id;
    let tarefas: Vec<_> = (0..8)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .equipe_service
                    .create(empresa_id, &novo_usuario(format!("c{}@corrida.com", i)))
                    .await
            })
        })
        .collect();

    let mut aceitos = 0;
    for tarefa in tarefas {
        match tarefa.await.unwrap() {
            Ok(_) => aceitos += 1,
            Err(e) => assert!(matches!(e, AppError::LimiteUsuariosAtingido)),
        }
    }

    assert_eq!(aceitos, 4);
    assert_eq!(
        contar(&pool, "SELECT COUNT(*) FROM usuarios WHERE empresa_id = $1", empresa.id).await,
        5
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn other_tenants_records_cannot_be_changed(pool: PgPool) {
    let state = state(pool);
    let (dona, admin_dona) = nova_empresa(&state, "Dona").await;
    let (intrusa, admin_intrusa) = nova_empresa(&state, "Intrusa").await;

    let aluno = state
        .turma_service
        .add_aluno(dona.id, "3A", Some("Maria"))
        .await
        .unwrap();
    let (parente, _) = state
        .parente_service
        .create(
            dona.id,
            &ParentePayload {
                formando_id: Some(aluno.id),
                grau: Some("Mãe".into()),
                cidade: Some("Campinas".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let edicao = ParentePayload { nome: Some("Invasor".into()), ..Default::default() };
    let err = state.parente_service.update(intrusa.id, parente.id, &edicao).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = state.parente_service.delete(intrusa.id, parente.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let edicao = UpdateUsuarioPayload { nome: Some("Invasor".into()), papel: Some(Papel::Visualizador) };
    let err = state.equipe_service.update(intrusa.id, admin_dona.id, &edicao).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = state.equipe_service.delete(&admin_intrusa, admin_dona.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Nada mudou do lado da dona
    let parentes = state.parente_service.list(dona.id, aluno.id).await.unwrap();
    assert_eq!(parentes.len(), 1);
    assert_eq!(parentes[0].nome, "Sem nome");
    let equipe = state.equipe_service.list(dona.id).await.unwrap();
    assert!(equipe.iter().any(|u| u.id == admin_dona.id && u.papel == Papel::Adm));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn overlong_import_rows_are_skipped_not_fatal(pool: PgPool) {
    let state = state(pool.clone());
    let (empresa, _) = nova_empresa(&state, "Longo").await;

    let csv = format!("turma,aluno\n3A,Maria\n3A,{}\n", "x".repeat(101));
    let inseridos = state
        .turma_service
        .importar(empresa.id, "lista.csv", csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(inseridos, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "precisa de DATABASE_URL"]
async fn dashboard_counts_come_from_one_snapshot(pool: PgPool) {
    let state = state(pool);
    let (empresa, _) = nova_empresa(&state, "Painel").await;
    state
        .turma_service
        .importar(empresa.id, "lista.csv", b"turma,aluno\n3A,Maria\n3A,Pedro\n3B,Ana\n")
        .await
        .unwrap();

    let dashboard = state
        .dashboard_service
        .get(empresa.id, &Default::default())
        .await
        .unwrap();
    assert_eq!(dashboard.stats.turmas, 2);
    assert_eq!(dashboard.stats.alunos, 3);
    assert_eq!(dashboard.stats.parentes, 0);
}
