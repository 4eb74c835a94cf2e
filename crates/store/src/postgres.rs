use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DiscountId, Money, OrderId, WorkerId, WorkerKind};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use crate::{
    CustomerRepository, DiscountRepository, OrderRepository, Result, SequenceStore, StoreError,
    WorkerRepository,
    query::{DiscountFilter, ListQuery, OrderFilter, Page},
    records::{AppliedDiscount, Customer, Discount, Order, Worker},
};

const CUSTOMER_COLUMNS: &str = "id, phone, name, email, address, city, district, total_orders, \
     last_order_date, total_spent, rating, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, order_number, customer_id, service_type, service_date, \
     service_time, address, city, district, notes, amount, discount_id, original_amount, \
     discount_amount, status, selected_worker_id, selected_housemaid_id, assigned_workers, \
     assigned_housemaids, whatsapp_sent, is_inquiry, completed_at, created_at, updated_at";

const DISCOUNT_COLUMNS: &str = "id, name, description, discount_type, discount_value, \
     start_date, end_date, is_active, target_type, max_uses, current_uses, created_at, updated_at";

const WORKER_COLUMNS: &str = "id, name, phone, kind, is_available, created_at";

/// PostgreSQL-backed document store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a small pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        tracing::info!("connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    fn row_to_customer(row: PgRow) -> Result<Customer> {
        Ok(Customer {
            id: CustomerId::from_uuid(row.try_get("id")?),
            phone: row.try_get("phone")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            district: row.try_get("district")?,
            total_orders: row.try_get("total_orders")?,
            last_order_date: row.try_get("last_order_date")?,
            total_spent: Money::from_cents(row.try_get("total_spent")?),
            rating: row.try_get("rating")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let discount_id: Option<Uuid> = row.try_get("discount_id")?;
        let original_amount: Option<i64> = row.try_get("original_amount")?;
        let discount_amount: Option<i64> = row.try_get("discount_amount")?;
        let discount = match (discount_id, original_amount, discount_amount) {
            (Some(id), Some(original), Some(amount)) => Some(AppliedDiscount {
                discount_id: DiscountId::from_uuid(id),
                original_amount: Money::from_cents(original),
                discount_amount: Money::from_cents(amount),
            }),
            _ => None,
        };

        let status: String = row.try_get("status")?;
        let assigned_workers: Vec<Uuid> = row.try_get("assigned_workers")?;
        let assigned_housemaids: Vec<Uuid> = row.try_get("assigned_housemaids")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get("id")?),
            order_number: row.try_get("order_number")?,
            customer: CustomerId::from_uuid(row.try_get("customer_id")?),
            service_type: row.try_get("service_type")?,
            date: row.try_get("service_date")?,
            time: row.try_get("service_time")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            district: row.try_get("district")?,
            notes: row.try_get("notes")?,
            amount: Money::from_cents(row.try_get("amount")?),
            discount,
            status: status
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("{e}")))?,
            selected_worker_id: row
                .try_get::<Option<Uuid>, _>("selected_worker_id")?
                .map(WorkerId::from_uuid),
            selected_housemaid_id: row
                .try_get::<Option<Uuid>, _>("selected_housemaid_id")?
                .map(WorkerId::from_uuid),
            assigned_workers: assigned_workers.into_iter().map(WorkerId::from).collect(),
            assigned_housemaids: assigned_housemaids
                .into_iter()
                .map(WorkerId::from)
                .collect(),
            whatsapp_sent: row.try_get("whatsapp_sent")?,
            is_inquiry: row.try_get("is_inquiry")?,
            completed_at: row.try_get("completed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_discount(row: PgRow) -> Result<Discount> {
        let discount_type: String = row.try_get("discount_type")?;
        let target_type: String = row.try_get("target_type")?;

        Ok(Discount {
            id: DiscountId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            discount_type: discount_type
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("{e}")))?,
            discount_value: row.try_get("discount_value")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            is_active: row.try_get("is_active")?,
            target_type: target_type
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("{e}")))?,
            max_uses: row.try_get("max_uses")?,
            current_uses: row.try_get("current_uses")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_worker(row: PgRow) -> Result<Worker> {
        let kind: String = row.try_get("kind")?;

        Ok(Worker {
            id: WorkerId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            kind: kind
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("{e}")))?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Runs a `COUNT(*)` and a paged `SELECT` sharing one WHERE clause.
    async fn fetch_page<T>(
        &self,
        table: &str,
        columns: &str,
        order_by: &str,
        clause: &WhereClause,
        query: &ListQuery,
        map: fn(PgRow) -> Result<T>,
    ) -> Result<Page<T>> {
        let where_sql = clause.sql();

        let count_sql = format!("SELECT COUNT(*) FROM {table}{where_sql}");
        let total: i64 = clause
            .bind(sqlx::query(&count_sql))
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let select_sql = format!(
            "SELECT {columns} FROM {table}{where_sql} ORDER BY {order_by} LIMIT {} OFFSET {}",
            query.limit,
            query.offset()
        );
        let rows = clause
            .bind(sqlx::query(&select_sql))
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(map).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total.max(0) as u64, query))
    }
}

/// A bind parameter for dynamically built WHERE clauses.
#[derive(Debug, Clone)]
enum Arg {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// Accumulates `AND`-joined conditions with positional parameters.
#[derive(Debug, Default)]
struct WhereClause {
    conditions: Vec<String>,
    args: Vec<Arg>,
}

impl WhereClause {
    /// Adds a condition; every `{}` in `template` refers to the same new parameter.
    fn push(&mut self, template: &str, arg: Arg) {
        self.args.push(arg);
        let placeholder = format!("${}", self.args.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    /// Adds a case-insensitive regex match across `columns`.
    fn search(&mut self, query: &ListQuery, columns: &[&str]) {
        if let Some(pattern) = query.search_pattern() {
            let template = columns
                .iter()
                .map(|c| format!("{c} ~* {{}}"))
                .collect::<Vec<_>>()
                .join(" OR ");
            self.push(&format!("({template})"), Arg::Text(pattern));
        }
    }

    fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn bind<'q>(
        &self,
        mut query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        for arg in &self.args {
            query = match arg {
                Arg::Text(v) => query.bind(v.clone()),
                Arg::Uuid(v) => query.bind(*v),
                Arg::Bool(v) => query.bind(*v),
                Arg::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }
}

/// Maps a unique violation to `DuplicateKey`, naming the field by constraint.
fn map_unique(
    err: sqlx::Error,
    entity: &'static str,
    fields: &[(&str, &'static str)],
) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let field = db_err
            .constraint()
            .and_then(|name| fields.iter().find(|(c, _)| *c == name))
            .map(|(_, field)| *field)
            .unwrap_or("id");
        return StoreError::DuplicateKey { entity, field };
    }
    StoreError::Database(err)
}

#[async_trait]
impl CustomerRepository for PostgresStore {
    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, phone, name, email, address, city, district, total_orders,
                                   last_order_date, total_spent, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.district)
        .bind(customer.total_orders)
        .bind(customer.last_order_date)
        .bind(customer.total_spent.cents())
        .bind(customer.rating)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Customer", &[("customers_phone_key", "phone")]))?;

        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET phone = $2, name = $3, email = $4, address = $5, city = $6, district = $7,
                rating = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.district)
        .bind(customer.rating)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Customer", &[("customers_phone_key", "phone")]))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", customer.id));
        }
        Ok(())
    }

    async fn record_customer_order(
        &self,
        id: CustomerId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET total_orders = total_orders + 1,
                total_spent = total_spent + $2,
                last_order_date = $3,
                updated_at = $3
            WHERE id = $1 AND total_spent <= $4 - $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(amount.cents())
        .bind(at)
        .bind(i64::MAX)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
                    .bind(id.as_uuid())
                    .fetch_one(&self.pool)
                    .await?;
            return Err(if exists {
                StoreError::Overflow {
                    entity: "Customer",
                    field: "totalSpent",
                }
            } else {
                StoreError::not_found("Customer", id)
            });
        }
        Ok(())
    }

    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>> {
        let mut clause = WhereClause::default();
        clause.search(query, &["name", "phone", "email"]);

        self.fetch_page(
            "customers",
            CUSTOMER_COLUMNS,
            "created_at DESC",
            &clause,
            query,
            Self::row_to_customer,
        )
        .await
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        let assigned_workers: Vec<Uuid> = order
            .assigned_workers
            .iter()
            .map(|w| w.as_uuid())
            .collect();
        let assigned_housemaids: Vec<Uuid> = order
            .assigned_housemaids
            .iter()
            .map(|w| w.as_uuid())
            .collect();

        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
             $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)"
        ))
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.customer.as_uuid())
        .bind(&order.service_type)
        .bind(order.date)
        .bind(&order.time)
        .bind(&order.address)
        .bind(&order.city)
        .bind(&order.district)
        .bind(&order.notes)
        .bind(order.amount.cents())
        .bind(order.discount.map(|d| d.discount_id.as_uuid()))
        .bind(order.discount.map(|d| d.original_amount.cents()))
        .bind(order.discount.map(|d| d.discount_amount.cents()))
        .bind(order.status.as_str())
        .bind(order.selected_worker_id.map(|w| w.as_uuid()))
        .bind(order.selected_housemaid_id.map(|w| w.as_uuid()))
        .bind(assigned_workers)
        .bind(assigned_housemaids)
        .bind(order.whatsapp_sent)
        .bind(order.is_inquiry)
        .bind(order.completed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Order", &[("orders_order_number_key", "orderNumber")]))?;

        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let assigned_workers: Vec<Uuid> = order
            .assigned_workers
            .iter()
            .map(|w| w.as_uuid())
            .collect();
        let assigned_housemaids: Vec<Uuid> = order
            .assigned_housemaids
            .iter()
            .map(|w| w.as_uuid())
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET customer_id = $2, service_type = $3, service_date = $4, service_time = $5,
                address = $6, city = $7, district = $8, notes = $9, amount = $10,
                discount_id = $11, original_amount = $12, discount_amount = $13, status = $14,
                selected_worker_id = $15, selected_housemaid_id = $16, assigned_workers = $17,
                assigned_housemaids = $18, is_inquiry = $19, completed_at = $20, updated_at = $21
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer.as_uuid())
        .bind(&order.service_type)
        .bind(order.date)
        .bind(&order.time)
        .bind(&order.address)
        .bind(&order.city)
        .bind(&order.district)
        .bind(&order.notes)
        .bind(order.amount.cents())
        .bind(order.discount.map(|d| d.discount_id.as_uuid()))
        .bind(order.discount.map(|d| d.original_amount.cents()))
        .bind(order.discount.map(|d| d.discount_amount.cents()))
        .bind(order.status.as_str())
        .bind(order.selected_worker_id.map(|w| w.as_uuid()))
        .bind(order.selected_housemaid_id.map(|w| w.as_uuid()))
        .bind(assigned_workers)
        .bind(assigned_housemaids)
        .bind(order.is_inquiry)
        .bind(order.completed_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", order.id));
        }
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_orders(&self, query: &ListQuery, filter: &OrderFilter) -> Result<Page<Order>> {
        let mut clause = WhereClause::default();
        if let Some(status) = filter.status {
            clause.push("status = {}", Arg::Text(status.as_str().to_string()));
        }
        if let Some(customer) = filter.customer {
            clause.push("customer_id = {}", Arg::Uuid(customer.as_uuid()));
        }
        clause.search(
            query,
            &["order_number", "service_type", "address", "city", "district"],
        );

        self.fetch_page(
            "orders",
            ORDER_COLUMNS,
            "created_at DESC",
            &clause,
            query,
            Self::row_to_order,
        )
        .await
    }

    async fn claim_notification(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET whatsapp_sent = TRUE WHERE id = $1 AND whatsapp_sent = FALSE",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish "already claimed" from "no such order".
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(StoreError::not_found("Order", id));
        }
        Ok(false)
    }

    async fn release_notification(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET whatsapp_sent = FALSE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Order", id));
        }
        Ok(())
    }
}

#[async_trait]
impl DiscountRepository for PostgresStore {
    async fn get_discount(&self, id: DiscountId) -> Result<Option<Discount>> {
        let row = sqlx::query(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_discount).transpose()
    }

    async fn insert_discount(&self, discount: &Discount) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO discounts ({DISCOUNT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(discount.id.as_uuid())
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.discount_type.as_str())
        .bind(discount.discount_value)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.is_active)
        .bind(discount.target_type.as_str())
        .bind(discount.max_uses)
        .bind(discount.current_uses)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Discount", &[]))?;

        Ok(())
    }

    async fn update_discount(&self, discount: &Discount) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET name = $2, description = $3, discount_type = $4, discount_value = $5,
                start_date = $6, end_date = $7, is_active = $8, target_type = $9,
                max_uses = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(discount.id.as_uuid())
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.discount_type.as_str())
        .bind(discount.discount_value)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.is_active)
        .bind(discount.target_type.as_str())
        .bind(discount.max_uses)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Discount", discount.id));
        }
        Ok(())
    }

    async fn delete_discount(&self, id: DiscountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_discounts(
        &self,
        query: &ListQuery,
        filter: &DiscountFilter,
    ) -> Result<Page<Discount>> {
        let mut clause = WhereClause::default();
        if let Some(target) = filter.target {
            clause.push(
                "(target_type = {} OR target_type = 'all')",
                Arg::Text(target.as_str().to_string()),
            );
        }
        if let Some(active) = filter.active {
            clause.push("is_active = {}", Arg::Bool(active));
        }
        if let Some(at) = filter.running_at {
            clause.push("(start_date <= {} AND end_date >= {})", Arg::Timestamp(at));
        }
        clause.search(query, &["name", "description"]);

        self.fetch_page(
            "discounts",
            DISCOUNT_COLUMNS,
            "created_at DESC",
            &clause,
            query,
            Self::row_to_discount,
        )
        .await
    }

    async fn redeem_discount(&self, id: DiscountId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET current_uses = current_uses + 1
            WHERE id = $1 AND (max_uses IS NULL OR current_uses < max_uses)
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM discounts WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(StoreError::not_found("Discount", id));
        }
        Ok(false)
    }

    async fn release_discount(&self, id: DiscountId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE discounts
            SET current_uses = current_uses - 1
            WHERE id = $1 AND current_uses > 0
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl WorkerRepository for PostgresStore {
    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        let row = sqlx::query(&format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_worker).transpose()
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO workers ({WORKER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(worker.id.as_uuid())
        .bind(&worker.name)
        .bind(&worker.phone)
        .bind(worker.kind.as_str())
        .bind(worker.is_available)
        .bind(worker.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Worker", &[]))?;

        Ok(())
    }

    async fn list_workers(
        &self,
        query: &ListQuery,
        kind: Option<WorkerKind>,
    ) -> Result<Page<Worker>> {
        let mut clause = WhereClause::default();
        if let Some(kind) = kind {
            clause.push("kind = {}", Arg::Text(kind.as_str().to_string()));
        }
        clause.search(query, &["name", "phone"]);

        self.fetch_page(
            "workers",
            WORKER_COLUMNS,
            "name ASC",
            &clause,
            query,
            Self::row_to_worker,
        )
        .await
    }
}

#[async_trait]
impl SequenceStore for PostgresStore {
    async fn next_sequence(&self, name: &str) -> Result<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequences (name, value) VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = sequences.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }
}
