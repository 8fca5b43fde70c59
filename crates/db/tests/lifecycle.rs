//! Integration tests for the workflow lifecycle transactions.
//!
//! Exercises the repository layer against a real database:
//! - Step number allocation, including under concurrent submissions
//! - Finalize preconditions and the finished state
//! - Rollback resolution: clone atomicity and single-shot resolution
//! - Soft-delete visibility rules for workflows and forms
//! - Evaluation uniqueness

use muralis_db::models::evaluation::CreateEvaluation;
use muralis_db::models::form::CreateForm;
use muralis_db::models::rollback::CreateRollbackRequest;
use muralis_db::models::user::CreateUser;
use muralis_db::models::workflow::{CreateWorkflow, UpdateWorkflow};
use muralis_db::repositories::{
    DeleteFormOutcome, DeleteWorkflowOutcome, EvaluationRepo, FinalizeOutcome, FormRepo,
    ResolveOutcome, RoleRepo, RollbackRepo, StepLogRepo, SubmitOutcome, UpdateWorkflowOutcome,
    UserRepo, WorkflowRepo,
};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str, role_key: &str) -> i64 {
    let role = RoleRepo::find_by_key(pool, role_key)
        .await
        .unwrap()
        .expect("seeded role");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: "$argon2id$test".to_string(),
            full_name: format!("{username} (test)"),
            role_id: role.id,
            email: None,
            phone: None,
            unit: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_workflow(pool: &PgPool, initiator_id: i64, title: &str) -> Uuid {
    WorkflowRepo::create(
        pool,
        initiator_id,
        &CreateWorkflow {
            title: title.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_form(workflow_id: Uuid, submitter_id: i64, opinion: &str) -> CreateForm {
    CreateForm {
        workflow_id,
        submitter_id,
        image_url: None,
        image_meta: None,
        image_desc: None,
        restoration_opinion: Some(opinion.to_string()),
        opinion_tags: None,
        remark: None,
        attachments: None,
    }
}

async fn submit(pool: &PgPool, workflow_id: Uuid, submitter_id: i64, opinion: &str) -> Uuid {
    match FormRepo::submit(pool, &new_form(workflow_id, submitter_id, opinion))
        .await
        .unwrap()
    {
        SubmitOutcome::Submitted(form) => form.id,
        other => panic!("expected submission to succeed, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: Step allocation and status transitions on submit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_submit_allocates_steps_and_starts_workflow(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "North wall fresco").await;

    let before = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.status, "draft");
    assert_eq!(before.current_step, 1);

    let first = submit(&pool, workflow_id, restorer, "surface survey").await;
    let second = submit(&pool, workflow_id, restorer, "salt removal").await;

    let after = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, "running");
    assert_eq!(after.current_step, 2);

    let forms = FormRepo::list_for_workflow(&pool, workflow_id).await.unwrap();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].id, first);
    assert_eq!(forms[0].step_no, 1);
    assert_eq!(forms[1].id, second);
    assert_eq!(forms[1].step_no, 2);

    // Each submission leaves exactly one 'submit' audit entry.
    let logs = StepLogRepo::list_for_form(&pool, first).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "submit");
    assert_eq!(logs[0].operator_id, restorer);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_submit_refused_once_finished(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Apse mural").await;
    let form_id = submit(&pool, workflow_id, restorer, "cleaning").await;

    let outcome = WorkflowRepo::finalize(&pool, workflow_id, form_id, restorer)
        .await
        .unwrap();
    assert!(matches!(outcome, FinalizeOutcome::Finalized(_)));

    let refused = FormRepo::submit(&pool, &new_form(workflow_id, restorer, "late step"))
        .await
        .unwrap();
    match refused {
        SubmitOutcome::NotAccepting(status) => assert_eq!(status, "finished"),
        other => panic!("expected refusal, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: Concurrent submissions allocate contiguous step numbers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_submits_get_contiguous_steps(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Concurrent wall").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            FormRepo::submit(&pool, &new_form(workflow_id, restorer, &format!("step {i}"))).await
        }));
    }
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    }

    let forms = FormRepo::list_for_workflow(&pool, workflow_id).await.unwrap();
    let steps: Vec<i32> = forms.iter().map(|f| f.step_no).collect();
    assert_eq!(steps, (1..=8).collect::<Vec<i32>>());

    let workflow = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workflow.current_step, 8);
}

// ---------------------------------------------------------------------------
// Test: Finalize preconditions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_finalize_requires_running_and_is_single_shot(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Nave ceiling").await;

    // A draft with no forms has nothing to accept.
    let bogus_form = Uuid::new_v4();
    let draft = WorkflowRepo::finalize(&pool, workflow_id, bogus_form, restorer)
        .await
        .unwrap();
    assert!(matches!(draft, FinalizeOutcome::Refused(_)));

    let form_id = submit(&pool, workflow_id, restorer, "inpainting").await;
    let done = WorkflowRepo::finalize(&pool, workflow_id, form_id, restorer)
        .await
        .unwrap();
    let FinalizeOutcome::Finalized(workflow) = done else {
        panic!("expected finalize to succeed");
    };
    assert_eq!(workflow.status, "finished");
    assert!(workflow.is_finalized);

    let again = WorkflowRepo::finalize(&pool, workflow_id, form_id, restorer)
        .await
        .unwrap();
    assert!(matches!(again, FinalizeOutcome::Refused(_)));

    let logs = StepLogRepo::list_for_form(&pool, form_id).await.unwrap();
    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["submit", "finalize"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_finalize_rejects_foreign_form(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let wf_a = seed_workflow(&pool, restorer, "Wall A").await;
    let wf_b = seed_workflow(&pool, restorer, "Wall B").await;
    submit(&pool, wf_a, restorer, "step").await;
    let foreign_form = submit(&pool, wf_b, restorer, "step").await;

    let outcome = WorkflowRepo::finalize(&pool, wf_a, foreign_form, restorer)
        .await
        .unwrap();
    assert!(matches!(outcome, FinalizeOutcome::FormNotFound));
}

// ---------------------------------------------------------------------------
// Test: Rollback resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_approved_rollback_clones_form_and_reopens(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Transept mural").await;
    let target = submit(&pool, workflow_id, restorer, "good state").await;
    let last = submit(&pool, workflow_id, restorer, "botched retouch").await;
    let final_outcome = WorkflowRepo::finalize(&pool, workflow_id, last, restorer)
        .await
        .unwrap();
    assert!(matches!(final_outcome, FinalizeOutcome::Finalized(_)));

    let request = RollbackRepo::create(
        &pool,
        &CreateRollbackRequest {
            workflow_id,
            requester_id: restorer,
            target_form_id: target,
            reason: "retouch damaged the original pigment".to_string(),
            support_file_url: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, "pending");

    let outcome = RollbackRepo::resolve(&pool, request.id, true, admin)
        .await
        .unwrap();
    let ResolveOutcome::Approved(clone) = outcome else {
        panic!("expected approval to clone the target form");
    };
    assert_eq!(clone.step_no, 3);
    assert_eq!(clone.is_rollback_from, Some(target));
    assert_eq!(clone.restoration_opinion.as_deref(), Some("good state"));

    let workflow = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workflow.status, "running");
    assert!(!workflow.is_finalized);
    assert_eq!(workflow.current_step, 3);

    let resolved = RollbackRepo::find_visible_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, "approved");
    assert_eq!(resolved.approver_id, Some(admin));
    assert!(resolved.approved_at.is_some());

    // Resolution is single-shot.
    let again = RollbackRepo::resolve(&pool, request.id, false, admin)
        .await
        .unwrap();
    assert!(matches!(again, ResolveOutcome::NotPending));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rejected_rollback_leaves_workflow_untouched(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Crypt fresco").await;
    let target = submit(&pool, workflow_id, restorer, "step one").await;
    let last = submit(&pool, workflow_id, restorer, "step two").await;
    WorkflowRepo::finalize(&pool, workflow_id, last, restorer)
        .await
        .unwrap();

    let request = RollbackRepo::create(
        &pool,
        &CreateRollbackRequest {
            workflow_id,
            requester_id: restorer,
            target_form_id: target,
            reason: "second thoughts".to_string(),
            support_file_url: None,
        },
    )
    .await
    .unwrap();

    let outcome = RollbackRepo::resolve(&pool, request.id, false, admin)
        .await
        .unwrap();
    assert!(matches!(outcome, ResolveOutcome::Rejected));

    let workflow = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workflow.status, "finished");
    assert!(workflow.is_finalized);
    assert_eq!(
        FormRepo::list_for_workflow(&pool, workflow_id)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rollback_approval_aborts_when_target_deleted(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Dome mural").await;
    let target = submit(&pool, workflow_id, restorer, "old state").await;
    submit(&pool, workflow_id, restorer, "newer state").await;

    let request = RollbackRepo::create(
        &pool,
        &CreateRollbackRequest {
            workflow_id,
            requester_id: restorer,
            target_form_id: target,
            reason: "revert".to_string(),
            support_file_url: None,
        },
    )
    .await
    .unwrap();

    let deleted = FormRepo::soft_delete(&pool, target, admin).await.unwrap();
    assert!(matches!(deleted, DeleteFormOutcome::Deleted));

    let outcome = RollbackRepo::resolve(&pool, request.id, true, admin)
        .await
        .unwrap();
    assert!(matches!(outcome, ResolveOutcome::TargetFormMissing(id) if id == target));

    // The request stays pending and the resolution fields stay empty.
    let unresolved = RollbackRepo::find_visible_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unresolved.status, "pending");
    assert!(unresolved.approver_id.is_none());
    assert!(unresolved.approved_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: Soft-delete visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_delete_refused_while_forms_exist(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Chapel wall").await;
    submit(&pool, workflow_id, restorer, "step").await;

    let refused = WorkflowRepo::soft_delete(&pool, workflow_id).await.unwrap();
    assert!(matches!(refused, DeleteWorkflowOutcome::HasForms));

    let empty_id = seed_workflow(&pool, restorer, "Empty draft").await;
    let deleted = WorkflowRepo::soft_delete(&pool, empty_id).await.unwrap();
    assert!(matches!(deleted, DeleteWorkflowOutcome::Deleted));
    assert!(WorkflowRepo::find_visible_by_id(&pool, empty_id)
        .await
        .unwrap()
        .is_none());

    let again = WorkflowRepo::soft_delete(&pool, empty_id).await.unwrap();
    assert!(matches!(again, DeleteWorkflowOutcome::NotFound));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_form_delete_recomputes_current_step(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Portico fresco").await;
    let only = submit(&pool, workflow_id, restorer, "first").await;

    let refused = FormRepo::soft_delete(&pool, only, admin).await.unwrap();
    assert!(matches!(refused, DeleteFormOutcome::OnlyForm));

    let second = submit(&pool, workflow_id, restorer, "second").await;
    let deleted = FormRepo::soft_delete(&pool, second, admin).await.unwrap();
    assert!(matches!(deleted, DeleteFormOutcome::Deleted));

    let workflow = WorkflowRepo::find_visible_by_id(&pool, workflow_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workflow.current_step, 1);
    assert!(FormRepo::find_visible_by_id(&pool, second)
        .await
        .unwrap()
        .is_none());

    // The audit trail survives the soft delete.
    let logs = StepLogRepo::list_for_form(&pool, second).await.unwrap();
    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["submit", "admin_delete"]);

    // The freed step number is reused by the next submission.
    let third = submit(&pool, workflow_id, restorer, "third").await;
    let form = FormRepo::find_visible_by_id(&pool, third)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(form.step_no, 2);
}

// ---------------------------------------------------------------------------
// Test: Admin status override
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_revoked_is_terminal(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let workflow_id = seed_workflow(&pool, restorer, "Abandoned survey").await;
    submit(&pool, workflow_id, restorer, "step").await;

    let revoke = UpdateWorkflow {
        title: None,
        description: None,
        status: Some("revoked".to_string()),
    };
    let outcome = WorkflowRepo::admin_update(&pool, workflow_id, &revoke, admin)
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateWorkflowOutcome::Updated(_)));

    let reopen = UpdateWorkflow {
        title: None,
        description: None,
        status: Some("running".to_string()),
    };
    let refused = WorkflowRepo::admin_update(&pool, workflow_id, &reopen, admin)
        .await
        .unwrap();
    assert!(matches!(refused, UpdateWorkflowOutcome::Refused(_)));

    let submit_refused = FormRepo::submit(&pool, &new_form(workflow_id, restorer, "late"))
        .await
        .unwrap();
    assert!(matches!(submit_refused, SubmitOutcome::NotAccepting(_)));
}

// ---------------------------------------------------------------------------
// Test: Evaluation uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_evaluation_hits_unique_constraint(pool: PgPool) {
    let restorer = seed_user(&pool, "restorer1", "restorer").await;
    let evaluator = seed_user(&pool, "evaluator1", "evaluator").await;
    let workflow_id = seed_workflow(&pool, restorer, "Scored mural").await;
    let form_id = submit(&pool, workflow_id, restorer, "final state").await;
    WorkflowRepo::finalize(&pool, workflow_id, form_id, restorer)
        .await
        .unwrap();

    let input = CreateEvaluation {
        workflow_id,
        evaluator_id: evaluator,
        score: 87,
        comment: Some("well documented".to_string()),
        evaluation_file: None,
        personnel_confirmation: None,
    };
    let evaluation = EvaluationRepo::create(&pool, &input).await.unwrap();
    assert_eq!(evaluation.score, 87);

    assert!(EvaluationRepo::exists_for(&pool, workflow_id, evaluator)
        .await
        .unwrap());

    let duplicate = EvaluationRepo::create(&pool, &input).await;
    let err = duplicate.expect_err("unique constraint should fire");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(
        db_err.constraint(),
        Some("uq_evaluations_workflow_evaluator")
    );
}
