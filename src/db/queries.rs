//! Database queries for clients, the service catalog and shopping lists

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    Client, ClientInput, Service, ServiceFields, ServiceRecord, ShoppingList, ShoppingListEntry,
};

const CLIENT_COLUMNS: &str = "id, name, phone, email, address, notes, created_at, updated_at";

const SERVICE_COLUMNS: &str = "id, name, unit, net_price, vat_rate, material_mode, \
     estimated_material_price, materials, created_at, updated_at";

const SHOPPING_LIST_COLUMNS: &str = "id, name, quote_id, entries, created_at, updated_at";

// ==================== clients ====================

/// List clients alphabetically
pub async fn list_clients(pool: &PgPool) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {} FROM clients ORDER BY name ASC",
        CLIENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

pub async fn get_client(pool: &PgPool, id: Uuid) -> Result<Client> {
    sqlx::query_as::<_, Client>(&format!(
        "SELECT {} FROM clients WHERE id = $1",
        CLIENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))
}

pub async fn insert_client(pool: &PgPool, input: &ClientInput) -> Result<Client> {
    let client = sqlx::query_as::<_, Client>(&format!(
        r#"
        INSERT INTO clients (id, name, phone, email, address, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        CLIENT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(input.name.trim())
    .bind(input.phone.trim())
    .bind(input.email.trim())
    .bind(input.address.trim())
    .bind(&input.notes)
    .fetch_one(pool)
    .await?;

    Ok(client)
}

pub async fn update_client(pool: &PgPool, id: Uuid, input: &ClientInput) -> Result<Client> {
    sqlx::query_as::<_, Client>(&format!(
        r#"
        UPDATE clients
        SET name = $2, phone = $3, email = $4, address = $5, notes = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        CLIENT_COLUMNS
    ))
    .bind(id)
    .bind(input.name.trim())
    .bind(input.phone.trim())
    .bind(input.email.trim())
    .bind(input.address.trim())
    .bind(&input.notes)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))
}

/// Delete a client. Quotes keep their copied client data.
pub async fn delete_client(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Client {}", id)));
    }
    Ok(())
}

// ==================== service catalog ====================

pub async fn list_services(pool: &PgPool) -> Result<Vec<Service>> {
    let records = sqlx::query_as::<_, ServiceRecord>(&format!(
        "SELECT {} FROM services ORDER BY name ASC",
        SERVICE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    records.into_iter().map(ServiceRecord::into_service).collect()
}

pub async fn get_service(pool: &PgPool, id: Uuid) -> Result<Service> {
    sqlx::query_as::<_, ServiceRecord>(&format!(
        "SELECT {} FROM services WHERE id = $1",
        SERVICE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Service {}", id)))?
    .into_service()
}

pub async fn insert_service(pool: &PgPool, fields: &ServiceFields) -> Result<Service> {
    sqlx::query_as::<_, ServiceRecord>(&format!(
        r#"
        INSERT INTO services (
            id, name, unit, net_price, vat_rate, material_mode,
            estimated_material_price, materials
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        SERVICE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&fields.name)
    .bind(&fields.unit)
    .bind(fields.net_price)
    .bind(fields.vat_rate)
    .bind(fields.material_mode.as_str())
    .bind(fields.estimated_material_price)
    .bind(Json(&fields.materials))
    .fetch_one(pool)
    .await?
    .into_service()
}

pub async fn update_service(pool: &PgPool, id: Uuid, fields: &ServiceFields) -> Result<Service> {
    sqlx::query_as::<_, ServiceRecord>(&format!(
        r#"
        UPDATE services
        SET name = $2, unit = $3, net_price = $4, vat_rate = $5, material_mode = $6,
            estimated_material_price = $7, materials = $8, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        SERVICE_COLUMNS
    ))
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.unit)
    .bind(fields.net_price)
    .bind(fields.vat_rate)
    .bind(fields.material_mode.as_str())
    .bind(fields.estimated_material_price)
    .bind(Json(&fields.materials))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Service {}", id)))?
    .into_service()
}

/// Delete a catalog service. Quote lines copied from it are unaffected.
pub async fn delete_service(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Service {}", id)));
    }
    Ok(())
}

// ==================== shopping lists ====================

pub async fn list_shopping_lists(pool: &PgPool) -> Result<Vec<ShoppingList>> {
    let lists = sqlx::query_as::<_, ShoppingList>(&format!(
        "SELECT {} FROM shopping_lists ORDER BY created_at DESC",
        SHOPPING_LIST_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(lists)
}

pub async fn get_shopping_list(pool: &PgPool, id: Uuid) -> Result<ShoppingList> {
    sqlx::query_as::<_, ShoppingList>(&format!(
        "SELECT {} FROM shopping_lists WHERE id = $1",
        SHOPPING_LIST_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Shopping list {}", id)))
}

pub async fn insert_shopping_list(
    pool: &PgPool,
    name: &str,
    quote_id: Option<Uuid>,
    entries: &[ShoppingListEntry],
) -> Result<ShoppingList> {
    let list = sqlx::query_as::<_, ShoppingList>(&format!(
        r#"
        INSERT INTO shopping_lists (id, name, quote_id, entries)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        SHOPPING_LIST_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(quote_id)
    .bind(Json(entries))
    .fetch_one(pool)
    .await?;

    Ok(list)
}

/// Flip `entries[position].checked` in place.
///
/// Returns `None` when the list does not exist or has no such entry.
pub async fn toggle_shopping_entry(
    pool: &PgPool,
    id: Uuid,
    position: i32,
) -> Result<Option<ShoppingList>> {
    let list = sqlx::query_as::<_, ShoppingList>(&format!(
        r#"
        UPDATE shopping_lists
        SET entries = jsonb_set(
                entries,
                ARRAY[$2::TEXT, 'checked'],
                to_jsonb(NOT COALESCE((entries -> $2::INT ->> 'checked')::BOOLEAN, FALSE))
            ),
            updated_at = NOW()
        WHERE id = $1 AND $2::INT >= 0 AND $2::INT < jsonb_array_length(entries)
        RETURNING {}
        "#,
        SHOPPING_LIST_COLUMNS
    ))
    .bind(id)
    .bind(position)
    .fetch_optional(pool)
    .await?;

    Ok(list)
}

pub async fn delete_shopping_list(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Shopping list {}", id)));
    }
    Ok(())
}
