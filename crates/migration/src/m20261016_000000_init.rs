//! Initial schema for trip expense splitting:
//!
//! - `users`: identities (`id`) and their unique handles (`username`)
//! - `trips`: trips expenses belong to
//! - `expense_users`: ledger rows, one per user and trip
//! - `expenses`: submitted expenses
//! - `expense_shares`: one row per user owing part of an expense

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    DisplayName,
    Password,
}

#[derive(Iden)]
enum Trips {
    Table,
    Id,
    Name,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseUsers {
    Table,
    Id,
    TripId,
    UserId,
    IncomeMinor,
    OutcomeMinor,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    TripId,
    Name,
    Category,
    AmountMinor,
    Date,
    PayerId,
    CreatedBy,
}

#[derive(Iden)]
enum ExpenseShares {
    Table,
    ExpenseId,
    UserId,
    AmountMinor,
    Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(ColumnDef::new(Trips::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Trips::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trips-created_by")
                            .from(Trips::Table, Trips::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ledger rows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseUsers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseUsers::TripId).string().not_null())
                    .col(ColumnDef::new(ExpenseUsers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseUsers::IncomeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExpenseUsers::OutcomeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_users-trip_id")
                            .from(ExpenseUsers::Table, ExpenseUsers::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (trip, user): find-or-create relies on it.
        manager
            .create_index(
                Index::create()
                    .name("idx-expense_users-trip_id-user_id-unique")
                    .table(ExpenseUsers::Table)
                    .col(ExpenseUsers::TripId)
                    .col(ExpenseUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::TripId).string().not_null())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Date).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::PayerId).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-trip_id")
                            .from(Expenses::Table, Expenses::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-trip_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::TripId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense shares
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseShares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExpenseShares::ExpenseId).string().not_null())
                    .col(ColumnDef::new(ExpenseShares::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseShares::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseShares::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ExpenseShares::ExpenseId)
                            .col(ExpenseShares::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_shares-expense_id")
                            .from(ExpenseShares::Table, ExpenseShares::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenseShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
