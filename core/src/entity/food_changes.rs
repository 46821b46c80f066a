use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "food_changes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Set to NULL by the database when the targeted food is deleted.
    pub old_version_id: Option<Uuid>,
    pub is_deletion: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub snapshot: Json,
    #[sea_orm(column_type = "Double")]
    pub new_hazard_level: f64,
    pub new_is_approved: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub date: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_date: DateTimeWithTimeZone,
    pub applied_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub apply_error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::food_change_approvals::Entity")]
    Approvals,
}

impl Related<super::food_change_approvals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
