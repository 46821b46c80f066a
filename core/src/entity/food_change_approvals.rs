use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "food_change_approvals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub food_change_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub voted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::food_changes::Entity",
        from = "Column::FoodChangeId",
        to = "super::food_changes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FoodChange,
}

impl Related<super::food_changes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodChange.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
