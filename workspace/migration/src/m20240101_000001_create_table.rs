use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk_auto(Roles::Id))
                    .col(string_len(Roles::Name, 50).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 50).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len_null(Users::RealName, 100))
                    .col(string_len_null(Users::Gender, 10))
                    .col(string_len_null(Users::Phone, 20))
                    .col(string_len_null(Users::Email, 100))
                    .col(string_len_null(Users::Department, 50))
                    .col(string_len_null(Users::Position, 50))
                    .col(date_null(Users::HireDate))
                    .col(string_len_null(Users::Level, 20))
                    .col(decimal_len_null(Users::BaseSalary, 12, 2))
                    .col(string_len_null(Users::Status, 20))
                    .col(string_len_null(Users::Address, 255))
                    .col(boolean(Users::Enabled).default(true))
                    .col(integer_null(Users::ManagerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_manager")
                            .from(Users::Table, Users::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_roles table (join table)
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(integer(UserRoles::UserId))
                    .col(integer(UserRoles::RoleId))
                    .primary_key(
                        Index::create()
                            .name("pk_user_roles")
                            .col(UserRoles::UserId)
                            .col(UserRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_user")
                            .from(UserRoles::Table, UserRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_role")
                            .from(UserRoles::Table, UserRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create leave_requests table
        manager
            .create_table(
                Table::create()
                    .table(LeaveRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(LeaveRequests::Id))
                    .col(integer(LeaveRequests::EmployeeId))
                    .col(integer_null(LeaveRequests::ApproverId))
                    .col(string_len(LeaveRequests::LeaveType, 50))
                    .col(date(LeaveRequests::StartDate))
                    .col(date(LeaveRequests::EndDate))
                    .col(string_len_null(LeaveRequests::Reason, 500))
                    .col(string_len(LeaveRequests::Status, 20))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_requests_employee")
                            .from(LeaveRequests::Table, LeaveRequests::EmployeeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_requests_approver")
                            .from(LeaveRequests::Table, LeaveRequests::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendance_records table
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(AttendanceRecords::Id))
                    .col(integer(AttendanceRecords::UserId))
                    .col(date(AttendanceRecords::Date))
                    .col(time_null(AttendanceRecords::CheckInTime))
                    .col(time_null(AttendanceRecords::CheckOutTime))
                    .col(string_len(AttendanceRecords::Status, 20))
                    .col(string_len_null(AttendanceRecords::Remark, 255))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_records_user")
                            .from(AttendanceRecords::Table, AttendanceRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LeaveRequests::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    RealName,
    Gender,
    Phone,
    Email,
    Department,
    Position,
    HireDate,
    Level,
    BaseSalary,
    Status,
    Address,
    Enabled,
    ManagerId,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    UserId,
    RoleId,
}

#[derive(DeriveIden)]
enum LeaveRequests {
    Table,
    Id,
    EmployeeId,
    ApproverId,
    LeaveType,
    StartDate,
    EndDate,
    Reason,
    Status,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    UserId,
    Date,
    CheckInTime,
    CheckOutTime,
    Status,
    Remark,
}
