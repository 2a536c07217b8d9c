use crate::{
    auth::AuthSession,
    error::AppError,
    models::{Task, TaskInput, TaskUpdate},
    query::{SortDirection, TaskListParams, TaskListPlan},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// Maps a client-supplied sort field to a column. Unknown names are ignored
/// here rather than rejected; the planner passes them through uninterpreted.
fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "createdAt" => Some("created_at"),
        "updatedAt" => Some("updated_at"),
        "description" => Some("description"),
        "completed" => Some("completed"),
        _ => None,
    }
}

/// Retrieves the authenticated user's tasks.
///
/// Always scoped to the caller; the query plan adds the optional completed
/// filter, sort order, and pagination bounds on top of the ownership
/// predicate.
///
/// ## Query Parameters:
/// - `completed` (optional): literal `"true"`/`"false"`.
/// - `sortBy` (optional): `field:direction`, e.g. `createdAt:desc`.
/// - `limit` / `skip` (optional): non-negative integers.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskListParams>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let plan = TaskListPlan::from_params(&query_params);

    // Ownership predicate first; the plan only ever narrows it.
    let mut sql = format!(
        "SELECT {} FROM tasks WHERE owner_id = $1",
        TASK_COLUMNS
    );
    let mut param_count = 2;

    if plan.completed.is_some() {
        sql.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }

    let order = plan
        .sort
        .as_ref()
        .and_then(|spec| sort_column(&spec.field).map(|column| (column, spec.direction)));
    match order {
        Some((column, SortDirection::Descending)) => {
            sql.push_str(&format!(" ORDER BY {} DESC", column));
        }
        Some((column, SortDirection::Ascending)) => {
            sql.push_str(&format!(" ORDER BY {} ASC", column));
        }
        // Stable default so pagination windows don't shuffle between calls.
        None => sql.push_str(" ORDER BY created_at ASC"),
    }

    if plan.limit.is_some() {
        sql.push_str(&format!(" LIMIT ${}", param_count));
        param_count += 1;
    }
    if plan.skip > 0 {
        sql.push_str(&format!(" OFFSET ${}", param_count));
    }

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(session.user_id);

    if let Some(completed) = plan.completed {
        query_builder = query_builder.bind(completed);
    }
    if let Some(limit) = plan.limit {
        query_builder = query_builder.bind(limit);
    }
    if plan.skip > 0 {
        query_builder = query_builder.bind(plan.skip);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// The owner is set server-side from the session identity; any ownership
/// value in the payload is ignored.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `400 Bad Request`: If the description is missing, empty, or too long.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), session.user_id);

    // Insert task
    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, description, completed, owner_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.description)
    .bind(task.completed)
    .bind(task.owner_id)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a specific task by its ID.
///
/// The predicate is always `id AND owner_id`: a task owned by someone else
/// looks exactly like a task that does not exist.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON if found and owned by the caller.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: If the task does not exist or belongs to another user.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let task: Option<Task> = sqlx::query_as(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(session.user_id)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates a task, allow-listed fields only.
///
/// The payload schema is `TaskUpdate`; any key other than `description` or
/// `completed` fails deserialization (400) before this handler runs, so no
/// partial application of a mixed payload is possible. Ownership-scoped like
/// every other task operation.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `400 Bad Request`: Disallowed field in the payload or invalid value.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: If the task does not exist or belongs to another user.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_uuid = task_id.into_inner();

    if task_data.is_empty() {
        let task: Option<Task> = sqlx::query_as(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        ))
        .bind(task_uuid)
        .bind(session.user_id)
        .fetch_optional(&**pool)
        .await?;
        return match task {
            Some(task) => Ok(HttpResponse::Ok().json(task)),
            None => Err(AppError::NotFound("Task not found".into())),
        };
    }

    let mut sets: Vec<String> = Vec::new();
    let mut param_count = 1;
    if task_data.description.is_some() {
        sets.push(format!("description = ${}", param_count));
        param_count += 1;
    }
    if task_data.completed.is_some() {
        sets.push(format!("completed = ${}", param_count));
        param_count += 1;
    }

    let sql = format!(
        "UPDATE tasks SET {}, updated_at = NOW() WHERE id = ${} AND owner_id = ${} RETURNING {}",
        sets.join(", "),
        param_count,
        param_count + 1,
        TASK_COLUMNS
    );

    let mut query = sqlx::query_as::<_, Task>(&sql);
    if let Some(description) = &task_data.description {
        query = query.bind(description);
    }
    if let Some(completed) = task_data.completed {
        query = query.bind(completed);
    }
    let task: Option<Task> = query
        .bind(task_uuid)
        .bind(session.user_id)
        .fetch_optional(&**pool)
        .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task by its ID. Ownership-scoped.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: If the task does not exist or belongs to another user.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
        .bind(task_id.into_inner())
        .bind(session.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_column_mapping() {
        assert_eq!(sort_column("createdAt"), Some("created_at"));
        assert_eq!(sort_column("updatedAt"), Some("updated_at"));
        assert_eq!(sort_column("description"), Some("description"));
        assert_eq!(sort_column("completed"), Some("completed"));
        // Unknown fields are ignored, never interpolated into SQL.
        assert_eq!(sort_column("owner_id"), None);
        assert_eq!(sort_column("id; DROP TABLE tasks"), None);
    }
}
