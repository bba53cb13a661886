pub mod account;
pub mod sea_orm_active_enums;
