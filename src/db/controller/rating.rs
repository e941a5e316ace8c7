use deskio_core::Rating;
use sea_orm::{entity::*, query::*, ConnectionTrait};

use crate::db::{controller::Error, model, IDType};

pub async fn insert_rating<C: ConnectionTrait>(db: &C, rating: &Rating) -> Result<IDType, Error> {
    let res = model::rating::Rating::insert(model::rating::ActiveModel::from(rating))
        .exec(db).await
        .map_err(Error::SeaORM)?;
    log_debug!("Rating {} saved", res.last_insert_id);
    Ok(res.last_insert_id)
}

pub async fn all_ratings<C: ConnectionTrait>(db: &C) -> Result<Vec<Rating>, Error> {
    let models = model::rating::Rating::find()
        .order_by_asc(model::rating::Column::Id)
        .all(db).await
        .map_err(Error::SeaORM)?;
    Ok(models.into_iter().map(Rating::from).collect())
}
