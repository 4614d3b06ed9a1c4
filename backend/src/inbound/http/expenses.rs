//! Expense ledger HTTP handlers.
//!
//! ```text
//! POST   /api/v1/expenses
//! GET    /api/v1/expenses
//! GET    /api/v1/expenses/summary
//! GET    /api/v1/expenses/{id}
//! PATCH  /api/v1/expenses/{id}
//! DELETE /api/v1/expenses/{id}
//! POST   /api/v1/expenses/{id}/approve
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    ApproveExpenseRequest, CreateExpenseRequest, DeleteExpenseRequest, ExpensePayload,
    ExpenseSummaryRequest, GetExpenseRequest, ListExpensesRequest, UpdateExpenseRequest,
};
use crate::domain::{ActorContext, Error, ExpenseType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, double_option, invalid_enum_value_error, parse_date, parse_decimal,
    parse_optional_date, parse_optional_uuid, parse_uuid,
};

const EXPENSE_TYPES: &str = "travel, food, communication, accommodation, materials, other";

/// Request payload for filing an expense claim.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequestBody {
    #[schema(format = "uuid")]
    pub assignment_id: String,
    #[schema(example = "travel")]
    pub expense_type: String,
    #[schema(format = "date")]
    pub date: String,
    #[schema(example = "120.50")]
    pub amount: String,
    pub description: String,
    pub receipt_ref: Option<String>,
}

/// Request payload for editing a pending expense claim.
///
/// `receiptRef` is double-optional: absent leaves the reference alone,
/// explicit `null` clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequestBody {
    #[schema(example = "food")]
    pub expense_type: Option<String>,
    #[schema(format = "date")]
    pub date: Option<String>,
    #[schema(example = "80.00")]
    pub amount: Option<String>,
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub receipt_ref: Option<Option<String>>,
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListExpensesQuery {
    /// Restrict to one assignment.
    pub assignment_id: Option<String>,
    /// Restrict to one expense category.
    pub expense_type: Option<String>,
    /// Restrict to approved (`true`) or pending (`false`) claims.
    pub approved: Option<bool>,
    /// Earliest claim date to include.
    pub from: Option<String>,
    /// Latest claim date to include.
    pub to: Option<String>,
    /// Page size, clamped server-side.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Query parameters for the expense summary endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseSummaryQuery {
    /// Restrict to one assignment.
    pub assignment_id: Option<String>,
    /// Restrict to one expense category.
    pub expense_type: Option<String>,
    /// Earliest claim date to include.
    pub from: Option<String>,
    /// Latest claim date to include.
    pub to: Option<String>,
}

/// Approval stamp returned on approved claims.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    #[schema(format = "uuid")]
    pub approved_by: String,
    #[schema(format = "date-time")]
    pub approved_at: String,
}

/// Expense representation returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub assignment_id: String,
    #[schema(example = "travel")]
    pub expense_type: String,
    #[schema(format = "date")]
    pub date: String,
    #[schema(example = "120.50")]
    pub amount: String,
    pub description: String,
    pub receipt_ref: Option<String>,
    pub approval: Option<ApprovalBody>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<ExpensePayload> for ExpenseBody {
    fn from(value: ExpensePayload) -> Self {
        Self {
            id: value.id.to_string(),
            assignment_id: value.assignment_id.to_string(),
            expense_type: value.expense_type.to_string(),
            date: value.date.to_string(),
            amount: value.amount.to_string(),
            description: value.description,
            receipt_ref: value.receipt_ref,
            approval: value.approval.map(|approval| ApprovalBody {
                approved_by: approval.approved_by.to_string(),
                approved_at: approval.approved_at.to_rfc3339(),
            }),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Response payload listing expenses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesBody {
    pub expenses: Vec<ExpenseBody>,
}

/// Response payload for the expense summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummaryBody {
    #[schema(example = "350.00")]
    pub total_amount: String,
    #[schema(example = "200.00")]
    pub approved_amount: String,
    #[schema(example = "150.00")]
    pub pending_amount: String,
    pub count: i64,
}

fn parse_expense_type(value: String, field: FieldName) -> Result<ExpenseType, Error> {
    ExpenseType::from_str(value.as_str())
        .map_err(|_| invalid_enum_value_error(field, &value, EXPENSE_TYPES))
}

fn parse_optional_expense_type(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<ExpenseType>, Error> {
    value.map(|raw| parse_expense_type(raw, field)).transpose()
}

fn parse_create_payload(
    payload: CreateExpenseRequestBody,
    actor: ActorContext,
) -> Result<CreateExpenseRequest, Error> {
    Ok(CreateExpenseRequest {
        actor,
        assignment_id: parse_uuid(payload.assignment_id, FieldName::new("assignmentId"))?,
        expense_type: parse_expense_type(payload.expense_type, FieldName::new("expenseType"))?,
        date: parse_date(payload.date, FieldName::new("date"))?,
        amount: parse_decimal(payload.amount, FieldName::new("amount"))?,
        description: payload.description,
        receipt_ref: payload.receipt_ref,
    })
}

fn parse_update_payload(
    payload: UpdateExpenseRequestBody,
    actor: ActorContext,
    expense_id: uuid::Uuid,
) -> Result<UpdateExpenseRequest, Error> {
    Ok(UpdateExpenseRequest {
        actor,
        expense_id,
        expense_type: parse_optional_expense_type(
            payload.expense_type,
            FieldName::new("expenseType"),
        )?,
        date: parse_optional_date(payload.date, FieldName::new("date"))?,
        amount: payload
            .amount
            .map(|raw| parse_decimal(raw, FieldName::new("amount")))
            .transpose()?,
        description: payload.description,
        receipt_ref: payload.receipt_ref,
    })
}

/// File an expense claim against an assignment.
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = CreateExpenseRequestBody,
    responses(
        (status = 200, description = "Claim filed", body = ExpenseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Assignment not found", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "createExpense",
    security(("SessionCookie" = []))
)]
#[post("/expenses")]
pub async fn create_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateExpenseRequestBody>,
) -> ApiResult<web::Json<ExpenseBody>> {
    let actor = session.require_actor()?;
    let request = parse_create_payload(payload.into_inner(), actor)?;

    let response = state.expenses.create(request).await?;

    Ok(web::Json(ExpenseBody::from(response.expense)))
}

/// List expense claims with optional filters, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    params(ListExpensesQuery),
    responses(
        (status = 200, description = "Expenses matching the filters", body = ListExpensesBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "listExpenses",
    security(("SessionCookie" = []))
)]
#[get("/expenses")]
pub async fn list_expenses(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListExpensesQuery>,
) -> ApiResult<web::Json<ListExpensesBody>> {
    session.require_actor()?;
    let query = query.into_inner();

    let response = state
        .expenses_query
        .list(ListExpensesRequest {
            assignment_id: parse_optional_uuid(query.assignment_id, FieldName::new("assignmentId"))?,
            expense_type: parse_optional_expense_type(
                query.expense_type,
                FieldName::new("expenseType"),
            )?,
            approved: query.approved,
            from: parse_optional_date(query.from, FieldName::new("from"))?,
            to: parse_optional_date(query.to, FieldName::new("to"))?,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    Ok(web::Json(ListExpensesBody {
        expenses: response.expenses.into_iter().map(ExpenseBody::from).collect(),
    }))
}

/// Summarise expense totals for reporting.
#[utoipa::path(
    get,
    path = "/api/v1/expenses/summary",
    params(ExpenseSummaryQuery),
    responses(
        (status = 200, description = "Aggregated totals", body = ExpenseSummaryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "expenseSummary",
    security(("SessionCookie" = []))
)]
#[get("/expenses/summary")]
pub async fn expense_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ExpenseSummaryQuery>,
) -> ApiResult<web::Json<ExpenseSummaryBody>> {
    session.require_actor()?;
    let query = query.into_inner();

    let response = state
        .expenses_query
        .summary(ExpenseSummaryRequest {
            assignment_id: parse_optional_uuid(query.assignment_id, FieldName::new("assignmentId"))?,
            expense_type: parse_optional_expense_type(
                query.expense_type,
                FieldName::new("expenseType"),
            )?,
            from: parse_optional_date(query.from, FieldName::new("from"))?,
            to: parse_optional_date(query.to, FieldName::new("to"))?,
        })
        .await?;

    Ok(web::Json(ExpenseSummaryBody {
        total_amount: response.total_amount.to_string(),
        approved_amount: response.approved_amount.to_string(),
        pending_amount: response.pending_amount.to_string(),
        count: response.count,
    }))
}

/// Fetch one expense claim by id.
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{id}",
    params(("id" = String, Path, format = "uuid", description = "Expense id")),
    responses(
        (status = 200, description = "The expense", body = ExpenseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "getExpense",
    security(("SessionCookie" = []))
)]
#[get("/expenses/{id}")]
pub async fn get_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExpenseBody>> {
    session.require_actor()?;
    let expense_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let payload = state
        .expenses_query
        .get(GetExpenseRequest { expense_id })
        .await?;

    Ok(web::Json(ExpenseBody::from(payload)))
}

/// Edit a pending expense claim.
#[utoipa::path(
    patch,
    path = "/api/v1/expenses/{id}",
    params(("id" = String, Path, format = "uuid", description = "Expense id")),
    request_body = UpdateExpenseRequestBody,
    responses(
        (status = 200, description = "Updated expense", body = ExpenseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Approved claims are immutable", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "updateExpense",
    security(("SessionCookie" = []))
)]
#[patch("/expenses/{id}")]
pub async fn update_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateExpenseRequestBody>,
) -> ApiResult<web::Json<ExpenseBody>> {
    let actor = session.require_actor()?;
    let expense_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let request = parse_update_payload(payload.into_inner(), actor, expense_id)?;

    let response = state.expenses.update(request).await?;

    Ok(web::Json(ExpenseBody::from(response.expense)))
}

/// Delete a pending expense claim.
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}",
    params(("id" = String, Path, format = "uuid", description = "Expense id")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Approved claims are immutable", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "deleteExpense",
    security(("SessionCookie" = []))
)]
#[delete("/expenses/{id}")]
pub async fn delete_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let expense_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    state
        .expenses
        .delete(DeleteExpenseRequest { actor, expense_id })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Approve an expense claim, stamping the approver and time.
///
/// Approving an already-approved claim returns the original stamp unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/expenses/{id}/approve",
    params(("id" = String, Path, format = "uuid", description = "Expense id")),
    responses(
        (status = 200, description = "Approved expense", body = ExpenseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["expenses"],
    operation_id = "approveExpense",
    security(("SessionCookie" = []))
)]
#[post("/expenses/{id}/approve")]
pub async fn approve_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ExpenseBody>> {
    let actor = session.require_actor()?;
    let expense_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let response = state
        .expenses
        .approve(ApproveExpenseRequest { actor, expense_id })
        .await?;

    Ok(web::Json(ExpenseBody::from(response.expense)))
}

#[cfg(test)]
#[path = "expenses_tests.rs"]
mod tests;
