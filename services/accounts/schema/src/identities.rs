use sea_orm::entity::prelude::*;

/// Authentication-bearing record. One per account, whatever the role.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id PHC string. Never the plaintext.
    pub credential_hash: String,
    /// `admin`, `lecturer` or `student`.
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::lecturer_profiles::Entity")]
    LecturerProfile,
    #[sea_orm(has_one = "super::student_profiles::Entity")]
    StudentProfile,
}

impl Related<super::lecturer_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LecturerProfile.def()
    }
}

impl Related<super::student_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
