//! PostgreSQL Account Store Implementation

use chrono::NaiveDate;
use sqlx::PgPool;

use kernel::id::{AccountId, ChildId, ParentId};

use crate::domain::entity::{Account, Child, NewAccount, Parent};
use crate::domain::repository::AccountStore;
use crate::domain::value_object::{Email, Role};
use crate::error::{AccountError, AccountResult};

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, role, first_name, second_name, last_name, phone, email, email_verified, password_hash";

impl AccountStore for PgAccountStore {
    async fn get_by_email(&self, email: &Email) -> AccountResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn get_by_id(&self, id: AccountId) -> AccountResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn create(&self, account: &NewAccount) -> AccountResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (
                role,
                first_name,
                second_name,
                last_name,
                phone,
                email,
                email_verified,
                password_hash
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.role.code())
        .bind(&account.first_name)
        .bind(&account.second_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(account.email.as_str())
        .bind(account.email_verified)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AccountError::EmailTaken,
            _ => AccountError::Database(e),
        })?;

        row.into_account()
    }

    async fn mark_email_verified(&self, email: &Email) -> AccountResult<AccountId> {
        let id: Option<(i64,)> =
            sqlx::query_as("UPDATE accounts SET email_verified = TRUE WHERE email = $1 RETURNING id")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match id {
            Some((id,)) => Ok(AccountId::from(id)),
            None => Err(AccountError::AccountNotFound),
        }
    }

    async fn parent_profile(&self, account_id: AccountId) -> AccountResult<Option<Parent>> {
        let row = sqlx::query_as::<_, ParentRow>(
            r#"
            SELECT
                p.id,
                p.account_id,
                p.passport,
                p.passport_verified,
                a.first_name,
                a.second_name,
                a.last_name,
                a.phone,
                a.email,
                a.email_verified
            FROM accounts AS a
            JOIN parents AS p ON (p.account_id = a.id)
            WHERE a.id = $1
            "#,
        )
        .bind(i64::from(account_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ParentRow::into_parent))
    }

    async fn child_profile(&self, account_id: AccountId) -> AccountResult<Option<Child>> {
        let row = sqlx::query_as::<_, ChildRow>(
            r#"
            SELECT
                c.id,
                c.account_id,
                c.birth_date,
                a.first_name,
                a.second_name,
                a.last_name,
                a.phone,
                a.email,
                a.email_verified
            FROM accounts AS a
            JOIN children AS c ON (c.account_id = a.id)
            WHERE a.id = $1
            "#,
        )
        .bind(i64::from(account_id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ChildRow::into_child))
    }

    async fn create_parent_profile(&self, account_id: AccountId) -> AccountResult<Parent> {
        // ON CONFLICT keeps this idempotent for concurrent first requests
        sqlx::query(
            r#"
            INSERT INTO parents (account_id)
            VALUES ($1)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(i64::from(account_id))
        .execute(&self.pool)
        .await?;

        self.parent_profile(account_id)
            .await?
            .ok_or(AccountError::ProfileNotFound)
    }

    async fn children_of(&self, parent_id: ParentId) -> AccountResult<Vec<Child>> {
        let rows = sqlx::query_as::<_, ChildRow>(
            r#"
            SELECT
                c.id,
                c.account_id,
                c.birth_date,
                a.first_name,
                a.second_name,
                a.last_name,
                a.phone,
                a.email,
                a.email_verified
            FROM parents AS p
            JOIN parents_children AS pc ON (p.id = pc.parent_id)
            JOIN children AS c ON (c.id = pc.child_id)
            JOIN accounts AS a ON (a.id = c.account_id)
            WHERE p.id = $1
            "#,
        )
        .bind(i64::from(parent_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChildRow::into_child).collect())
    }

    async fn managers(&self) -> AccountResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = $1 ORDER BY id"
        ))
        .bind(Role::Manager.code())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    role: String,
    first_name: String,
    second_name: String,
    last_name: String,
    phone: String,
    email: String,
    email_verified: bool,
    password_hash: String,
}

impl AccountRow {
    fn into_account(self) -> AccountResult<Account> {
        Ok(Account {
            id: AccountId::from(self.id),
            role: Role::from_code(&self.role)?,
            first_name: self.first_name,
            second_name: self.second_name,
            last_name: self.last_name,
            phone: self.phone,
            email: Email::from_db(self.email),
            email_verified: self.email_verified,
            password_hash: self.password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ParentRow {
    id: i64,
    account_id: i64,
    passport: Option<String>,
    passport_verified: bool,
    first_name: String,
    second_name: String,
    last_name: String,
    phone: String,
    email: String,
    email_verified: bool,
}

impl ParentRow {
    fn into_parent(self) -> Parent {
        Parent {
            id: ParentId::from(self.id),
            account_id: AccountId::from(self.account_id),
            passport: self.passport,
            passport_verified: self.passport_verified,
            first_name: self.first_name,
            second_name: self.second_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            email_verified: self.email_verified,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChildRow {
    id: i64,
    account_id: i64,
    birth_date: Option<NaiveDate>,
    first_name: String,
    second_name: String,
    last_name: String,
    phone: String,
    email: String,
    email_verified: bool,
}

impl ChildRow {
    fn into_child(self) -> Child {
        Child {
            id: ChildId::from(self.id),
            account_id: AccountId::from(self.account_id),
            birth_date: self.birth_date,
            first_name: self.first_name,
            second_name: self.second_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            email_verified: self.email_verified,
        }
    }
}
