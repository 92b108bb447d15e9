//! Gallery image operations

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::{debug, info};

use super::{retry, GalleryFilter, GallerySort, SeaOrmStorage};
use crate::analytics::GalleryStat;
use crate::errors::{FinituraError, Result};
use crate::storage::models::{GalleryPatch, NewGalleryImage};

use migration::entities::gallery_image;

fn filter_condition(filter: &GalleryFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(ref category) = filter.category {
        condition = condition.add(gallery_image::Column::Category.eq(category.clone()));
    }

    if let Some(ref search) = filter.search {
        condition = condition.add(
            Condition::any()
                .add(gallery_image::Column::Title.contains(search))
                .add(gallery_image::Column::Category.contains(search)),
        );
    }

    condition
}

fn apply_sort(
    select: sea_orm::Select<gallery_image::Entity>,
    sort: GallerySort,
) -> sea_orm::Select<gallery_image::Entity> {
    match sort {
        GallerySort::Newest => select.order_by_desc(gallery_image::Column::CreatedAt),
        GallerySort::Oldest => select.order_by_asc(gallery_image::Column::CreatedAt),
        GallerySort::MostViewed => select.order_by_desc(gallery_image::Column::Views),
        GallerySort::MostLiked => select.order_by_desc(gallery_image::Column::Likes),
    }
}

impl SeaOrmStorage {
    pub async fn insert_gallery_image(
        &self,
        input: NewGalleryImage,
    ) -> Result<gallery_image::Model> {
        let now = Utc::now();
        let model = gallery_image::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(input.title),
            category: Set(input.category),
            image_url: Set(input.image_url),
            views: Set(0),
            likes: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            FinituraError::database_operation(format!("Gallery insert failed: {}", e))
        })?;

        self.invalidate_count_cache();
        info!("Gallery image created: {}", inserted.id);
        Ok(inserted)
    }

    pub async fn get_gallery_image(&self, id: &str) -> Result<Option<gallery_image::Model>> {
        let db = &self.db;
        let id_owned = id.to_string();

        retry::with_retry(
            &format!("get_gallery_image({})", id),
            self.retry_config,
            || async { gallery_image::Entity::find_by_id(&id_owned).one(db).await },
        )
        .await
        .map_err(|e| FinituraError::database_operation(format!("Gallery query failed: {}", e)))
    }

    pub async fn list_gallery_images(
        &self,
        page: u64,
        page_size: u64,
        filter: &GalleryFilter,
        sort: GallerySort,
    ) -> Result<(Vec<gallery_image::Model>, u64)> {
        let condition = filter_condition(filter);

        let cache_key = format!(
            "gallery:c={:?}:s={:?}:q={:?}",
            filter.category, sort, filter.search
        );

        let total = if let Some(cached) = self.count_cache.get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            cached
        } else {
            let db = &self.db;
            let cond = condition.clone();
            let count =
                retry::with_retry("list_gallery_images(count)", self.retry_config, || async {
                    gallery_image::Entity::find()
                        .filter(cond.clone())
                        .count(db)
                        .await
                })
                .await
                .map_err(|e| {
                    FinituraError::database_operation(format!("Gallery count failed: {}", e))
                })?;
            self.count_cache.insert(cache_key, count);
            count
        };

        let db = &self.db;
        let page_offset = page.saturating_sub(1);
        let models = retry::with_retry("list_gallery_images(data)", self.retry_config, || async {
            apply_sort(gallery_image::Entity::find().filter(condition.clone()), sort)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Gallery query failed: {}", e)))?;

        Ok((models, total))
    }

    pub async fn update_gallery_image(
        &self,
        id: &str,
        patch: GalleryPatch,
    ) -> Result<Option<gallery_image::Model>> {
        let Some(existing) = self.get_gallery_image(id).await? else {
            return Ok(None);
        };

        let mut model = gallery_image::ActiveModel {
            id: Set(existing.id),
            title: patch.title.map(Set).unwrap_or(NotSet),
            category: patch.category.map(Set).unwrap_or(NotSet),
            image_url: patch.image_url.map(Set).unwrap_or(NotSet),
            ..Default::default()
        };
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.db).await.map_err(|e| {
            FinituraError::database_operation(format!("Gallery update failed: {}", e))
        })?;

        self.invalidate_count_cache();
        Ok(Some(updated))
    }

    pub async fn delete_gallery_image(&self, id: &str) -> Result<bool> {
        let result = gallery_image::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                FinituraError::database_operation(format!("Gallery delete failed: {}", e))
            })?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        self.invalidate_count_cache();
        info!("Gallery image deleted: {}", id);
        Ok(true)
    }

    /// Atomic counter bump, same contract as the product variant
    pub async fn increment_gallery_stat(&self, id: &str, stat: GalleryStat) -> Result<u64> {
        let column = match stat {
            GalleryStat::Views => gallery_image::Column::Views,
            GalleryStat::Likes => gallery_image::Column::Likes,
        };

        let db = &self.db;
        let id_owned = id.to_string();
        let result = retry::with_retry(
            &format!("increment_gallery_stat({}, {})", id, stat.as_ref()),
            self.retry_config,
            || async {
                gallery_image::Entity::update_many()
                    .col_expr(column, Expr::col(column).add(1))
                    .filter(gallery_image::Column::Id.eq(&id_owned))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            FinituraError::database_operation(format!("Gallery stat increment failed: {}", e))
        })?;

        Ok(result.rows_affected)
    }
}
