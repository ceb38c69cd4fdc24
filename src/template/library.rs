//! Built-in Template Library
//!
//! Ready-made enterprise workflow templates covering common back-office
//! processes. These are configuration data expressed with the builder API;
//! the engine does not treat them specially. Callers typically seed a
//! catalog with them when no template file is supplied.

use super::model::{
    CheckpointDescriptor, GuardCondition, StepDescriptor, TriggerKind, WorkflowTemplate,
};

/// Returns the built-in enterprise templates.
pub fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        ap_invoice_processing(),
        expense_reimbursement(),
        new_hire_onboarding(),
        leave_request_management(),
        lead_qualification(),
        sales_proposal_generation(),
        it_service_request(),
        user_access_provisioning(),
        document_approval(),
        contract_management(),
    ]
}

/// Accounts payable: capture, match, and pay vendor invoices, with approval
/// routing based on amount thresholds.
fn ap_invoice_processing() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "ap_invoice_processing",
        "Accounts Payable Invoice Processing",
        "Finance & Accounting",
    )
    .with_trigger(
        TriggerKind::EventDriven,
        "New email received with invoice attachment or direct upload",
    )
    .with_step(StepDescriptor::new(0, "extract_invoice_data"))
    .with_step(StepDescriptor::new(1, "match_purchase_order"))
    .with_step(StepDescriptor::new(2, "three_way_match"))
    .with_step(StepDescriptor::new(3, "route_approval"))
    .with_step(StepDescriptor::new(4, "schedule_payment"))
    .with_checkpoint(CheckpointDescriptor::new(
        "manager_approval",
        GuardCondition::AmountBelow {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        },
        3,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "director_approval",
        GuardCondition::AmountAbove {
            key: "invoice_amount".to_string(),
            threshold: 5000.0,
        },
        3,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "exception_review",
        GuardCondition::FlagSet {
            key: "mismatch_detected".to_string(),
        },
        2,
    ))
}

/// Employee expense reports: receipt capture, policy check, reimbursement.
fn expense_reimbursement() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "expense_reimbursement",
        "Employee Expense Reimbursement",
        "Finance & Accounting",
    )
    .with_trigger(TriggerKind::Manual, "Employee submits expense report via portal")
    .with_step(StepDescriptor::new(0, "extract_receipt_data"))
    .with_step(StepDescriptor::new(1, "check_expense_policy"))
    .with_step(StepDescriptor::new(2, "process_reimbursement"))
    .with_checkpoint(CheckpointDescriptor::new(
        "manager_review",
        GuardCondition::FlagSet {
            key: "policy_violation".to_string(),
        },
        1,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "finance_final_approval",
        GuardCondition::Always,
        2,
    ))
}

/// New hire onboarding across HR and IT.
fn new_hire_onboarding() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "new_hire_onboarding",
        "New Hire Onboarding",
        "Human Resources",
    )
    .with_trigger(
        TriggerKind::EventDriven,
        "Candidate status changed to 'Hired' in ATS",
    )
    .with_step(StepDescriptor::new(0, "create_employee_profile"))
    .with_step(StepDescriptor::new(1, "provision_it_accounts").with_timeout_secs(300))
    .with_step(StepDescriptor::new(2, "send_welcome_email"))
    .with_step(StepDescriptor::new(3, "schedule_orientation"))
    .with_step(StepDescriptor::new(4, "schedule_checkins"))
    .with_checkpoint(CheckpointDescriptor::new(
        "it_confirmation",
        GuardCondition::Always,
        1,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "hr_final_review",
        GuardCondition::Always,
        4,
    ))
}

/// Employee leave requests: balance validation, approvals, calendar and
/// HRIS updates.
fn leave_request_management() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "leave_request_management",
        "Leave Request Management",
        "Human Resources",
    )
    .with_trigger(TriggerKind::Manual, "Employee submits leave request")
    .with_step(StepDescriptor::new(0, "validate_leave_balance"))
    .with_step(StepDescriptor::new(1, "route_manager_approval"))
    .with_step(StepDescriptor::new(2, "sync_team_calendar"))
    .with_step(StepDescriptor::new(3, "update_hris"))
    .with_checkpoint(CheckpointDescriptor::new(
        "manager_approval",
        GuardCondition::Always,
        1,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "hr_review",
        GuardCondition::FlagSet {
            key: "extended_leave".to_string(),
        },
        2,
    ))
}

/// Lead qualification and nurturing with a sales handoff gate for
/// high-scoring leads.
fn lead_qualification() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "lead_qualification",
        "Lead Qualification and Nurturing",
        "Marketing & Sales",
    )
    .with_trigger(TriggerKind::EventDriven, "New lead from website form or campaign")
    .with_step(StepDescriptor::new(0, "enrich_lead_data"))
    .with_step(StepDescriptor::new(1, "score_lead"))
    .with_step(StepDescriptor::new(2, "assign_nurture_campaign"))
    .with_step(StepDescriptor::new(3, "schedule_followups"))
    .with_step(StepDescriptor::new(4, "track_conversion"))
    .with_checkpoint(CheckpointDescriptor::new(
        "sales_rep_acceptance",
        GuardCondition::AmountAbove {
            key: "lead_score".to_string(),
            threshold: 80.0,
        },
        1,
    ))
}

/// Proposal assembly from CRM opportunity data, with manager and legal
/// gates before client delivery.
fn sales_proposal_generation() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "sales_proposal_generation",
        "Sales Proposal Generation",
        "Sales",
    )
    .with_trigger(TriggerKind::Manual, "Sales rep initiates from CRM opportunity")
    .with_step(StepDescriptor::new(0, "gather_customer_requirements"))
    .with_step(StepDescriptor::new(1, "configure_pricing"))
    .with_step(StepDescriptor::new(2, "generate_proposal_document"))
    .with_step(StepDescriptor::new(3, "route_proposal_approval"))
    .with_step(StepDescriptor::new(4, "deliver_to_client"))
    .with_checkpoint(CheckpointDescriptor::new(
        "legal_approval",
        GuardCondition::FlagSet {
            key: "non_standard_terms".to_string(),
        },
        2,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "sales_manager_review",
        GuardCondition::Always,
        3,
    ))
}

/// IT service request intake, routing, and resolution tracking.
fn it_service_request() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "it_service_request",
        "IT Service Request Management",
        "Information Technology",
    )
    .with_trigger(TriggerKind::Manual, "Service request submission via portal")
    .with_step(StepDescriptor::new(0, "categorize_request"))
    .with_step(StepDescriptor::new(1, "route_to_team"))
    .with_step(StepDescriptor::new(2, "match_knowledge_base"))
    .with_step(StepDescriptor::new(3, "track_progress"))
    .with_step(StepDescriptor::new(4, "confirm_resolution"))
    .with_checkpoint(CheckpointDescriptor::new(
        "technician_assignment",
        GuardCondition::FlagSet {
            key: "complex_request".to_string(),
        },
        1,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "escalation_review",
        GuardCondition::FlagSet {
            key: "sla_breached".to_string(),
        },
        3,
    ))
}

/// Role-based access provisioning across identity systems, gated on
/// manager authorization and security review for elevated access.
fn user_access_provisioning() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "user_access_provisioning",
        "User Access Provisioning",
        "Information Technology",
    )
    .with_trigger(TriggerKind::Manual, "Access request from manager")
    .with_step(StepDescriptor::new(0, "validate_access_requirements"))
    .with_step(StepDescriptor::new(1, "assign_role_permissions"))
    .with_step(StepDescriptor::new(2, "create_system_accounts"))
    .with_step(StepDescriptor::new(3, "verify_access"))
    .with_step(StepDescriptor::new(4, "document_audit_trail"))
    .with_checkpoint(CheckpointDescriptor::new(
        "manager_authorization",
        GuardCondition::Always,
        0,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "security_team_approval",
        GuardCondition::FlagSet {
            key: "elevated_access".to_string(),
        },
        1,
    ))
}

/// Document review routing, versioning, and publication.
fn document_approval() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "document_approval",
        "Document Approval Process",
        "Administration",
    )
    .with_trigger(TriggerKind::Manual, "Document submission for approval")
    .with_step(StepDescriptor::new(0, "extract_document_metadata"))
    .with_step(StepDescriptor::new(1, "route_document_review"))
    .with_step(StepDescriptor::new(2, "collect_review_comments"))
    .with_step(StepDescriptor::new(3, "finalize_version"))
    .with_step(StepDescriptor::new(4, "publish_document"))
    .with_checkpoint(CheckpointDescriptor::new(
        "expert_review",
        GuardCondition::FlagSet {
            key: "technical_document".to_string(),
        },
        2,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "department_head_approval",
        GuardCondition::Always,
        3,
    ))
}

/// Contract drafting, e-signature, and renewal tracking, with escalating
/// approval gates up to executive sign-off for high-value contracts.
fn contract_management() -> WorkflowTemplate {
    WorkflowTemplate::new(
        "contract_management",
        "Contract Management",
        "Legal & Administration",
    )
    .with_trigger(
        TriggerKind::Manual,
        "Contract creation request or scheduled renewal",
    )
    .with_step(StepDescriptor::new(0, "customize_contract_template"))
    .with_step(StepDescriptor::new(1, "support_legal_negotiation"))
    .with_step(StepDescriptor::new(2, "manage_esignature"))
    .with_step(StepDescriptor::new(3, "store_contract"))
    .with_step(StepDescriptor::new(4, "schedule_renewal_tracking"))
    .with_checkpoint(CheckpointDescriptor::new(
        "legal_review",
        GuardCondition::FlagSet {
            key: "non_standard_terms".to_string(),
        },
        1,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "business_owner_approval",
        GuardCondition::Always,
        2,
    ))
    .with_checkpoint(CheckpointDescriptor::new(
        "executive_signoff",
        GuardCondition::AmountAbove {
            key: "contract_value".to_string(),
            threshold: 100_000.0,
        },
        2,
    ))
}
