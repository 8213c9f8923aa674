use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use uuid::Uuid;

use littlenote_login_schema::accounts;

use crate::domain::repository::UserDirectory;
use crate::domain::types::Account;
use crate::error::LoginServiceError;

#[derive(Clone)]
pub struct DbUserDirectory {
    pub db: DatabaseConnection,
}

impl UserDirectory for DbUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, LoginServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        Ok(model.map(account_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, LoginServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        Ok(model.map(account_from_model))
    }

    async fn get_or_create(&self, email: &str) -> Result<(Account, bool), LoginServiceError> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok((existing, false));
        }

        let account = Account {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            display_name: email.to_owned(),
            created_at: Utc::now(),
        };
        // ON CONFLICT DO NOTHING: a concurrent first login of the same address
        // may win the insert; whoever loses re-reads the winner's row.
        let inserted = accounts::Entity::insert(accounts::ActiveModel {
            id: Set(account.id),
            email: Set(account.email.clone()),
            display_name: Set(account.display_name.clone()),
            created_at: Set(account.created_at),
        })
        .on_conflict(
            OnConflict::column(accounts::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("create account")?;

        if inserted > 0 {
            return Ok((account, true));
        }
        let existing = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("account missing after conflicting insert"))?;
        Ok((existing, false))
    }
}

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        display_name: model.display_name,
        created_at: model.created_at,
    }
}
