use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // orders: history per user in placement order
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "placed_at": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // orders: settlement samples by status
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "order_status": 1 })
            .build();

        col.create_index(model, None).await?;
    }

    // holdings: unique per (user_id, symbol)
    {
        let col = db.collection::<mongodb::bson::Document>("holdings");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
