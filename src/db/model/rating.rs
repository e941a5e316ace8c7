use sea_orm::entity::prelude::*;

use crate::db::IDType;

pub use Entity as Rating;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    /// Identifiant dans la base de données
    #[sea_orm(primary_key)]
    pub id: IDType,
    /// `happy`, `neutral` ou `sad`
    pub rating: Option<String>,
    /// Valeur telle que soumise, normalement 1 à 3
    pub value: Option<Json>,
    pub timestamp: DateTime,
    /// Autres champs soumis avec la note
    pub extra: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel 
{}

// Keys submitted as `null` have no column value: they are kept in `extra`.
const NULL_KEYS: [&str; 2] = ["rating", "value"];

impl From<&deskio_core::Rating> for ActiveModel {
    fn from(rating: &deskio_core::Rating) -> Self {
        let mut extra = rating.extra.clone();
        if let Some(None) = rating.rating {
            extra.insert(NULL_KEYS[0].to_string(), Json::Null);
        }
        if let Some(Json::Null) = rating.value {
            extra.insert(NULL_KEYS[1].to_string(), Json::Null);
        }
        Self {
            rating: sea_orm::ActiveValue::Set(rating.rating_str().map(str::to_string)),
            value: sea_orm::ActiveValue::Set(rating.value.clone().filter(|v| !v.is_null())),
            timestamp: sea_orm::ActiveValue::Set(rating.timestamp),
            extra: sea_orm::ActiveValue::Set(Json::Object(extra)),
            ..Default::default()
        }
    }
}

impl From<Model> for deskio_core::Rating {
    fn from(model: Model) -> Self {
        let mut extra = match model.extra {
            Json::Object(map) => map,
            _ => Default::default(),
        };
        let rating = match (model.rating, extra.remove(NULL_KEYS[0])) {
            (Some(label), _) => Some(Some(label)),
            (None, Some(_)) => Some(None),
            (None, None) => None,
        };
        let value = model.value.or_else(|| extra.remove(NULL_KEYS[1]));
        Self {
            rating,
            value,
            timestamp: model.timestamp,
            extra,
        }
    }
}
