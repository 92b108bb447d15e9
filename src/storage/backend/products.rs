//! Product catalogue operations

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::{retry, ProductFilter, ProductSort, SeaOrmStorage};
use crate::analytics::ProductStat;
use crate::errors::{FinituraError, Result};
use crate::storage::models::{NewProduct, ProductBrief, ProductPatch};

use migration::entities::product;

fn filter_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(ref category) = filter.category {
        condition = condition.add(product::Column::Category.eq(category.clone()));
    }

    if let Some(in_stock) = filter.in_stock {
        condition = condition.add(product::Column::InStock.eq(in_stock));
    }

    if let Some(min) = filter.min_price {
        condition = condition.add(product::Column::Price.gte(min));
    }

    if let Some(max) = filter.max_price {
        condition = condition.add(product::Column::Price.lte(max));
    }

    if let Some(ref search) = filter.search {
        condition = condition.add(
            Condition::any()
                .add(product::Column::Name.contains(search))
                .add(product::Column::Description.contains(search)),
        );
    }

    condition
}

fn apply_sort(
    select: sea_orm::Select<product::Entity>,
    sort: ProductSort,
) -> sea_orm::Select<product::Entity> {
    match sort {
        ProductSort::Newest => select.order_by_desc(product::Column::CreatedAt),
        ProductSort::Oldest => select.order_by_asc(product::Column::CreatedAt),
        ProductSort::PriceLow => select.order_by_asc(product::Column::Price),
        ProductSort::PriceHigh => select.order_by_desc(product::Column::Price),
        ProductSort::MostViewed => select.order_by_desc(product::Column::Views),
        ProductSort::MostLiked => select.order_by_desc(product::Column::Likes),
        ProductSort::MostContacted => select.order_by_desc(product::Column::Contacts),
    }
}

impl SeaOrmStorage {
    pub async fn insert_product(&self, input: NewProduct) -> Result<product::Model> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category: Set(input.category),
            image_url: Set(input.image_url),
            in_stock: Set(input.in_stock),
            views: Set(0),
            likes: Set(0),
            shares: Set(0),
            contacts: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| FinituraError::database_operation(format!("Product insert failed: {}", e)))?;

        self.invalidate_count_cache();
        info!("Product created: {}", inserted.id);
        Ok(inserted)
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<product::Model>> {
        let db = &self.db;
        let id_owned = id.to_string();

        retry::with_retry(&format!("get_product({})", id), self.retry_config, || async {
            product::Entity::find_by_id(&id_owned).one(db).await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Product query failed: {}", e)))
    }

    /// Paginated product listing with cached COUNT
    pub async fn list_products(
        &self,
        page: u64,
        page_size: u64,
        filter: &ProductFilter,
        sort: ProductSort,
    ) -> Result<(Vec<product::Model>, u64)> {
        let condition = filter_condition(filter);

        let cache_key = format!(
            "products:c={:?}:s={:?}:p={:?}-{:?}:i={:?}:q={:?}",
            filter.category, sort, filter.min_price, filter.max_price, filter.in_stock,
            filter.search
        );

        let total = if let Some(cached) = self.count_cache.get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            cached
        } else {
            let db = &self.db;
            let cond = condition.clone();
            let count = retry::with_retry("list_products(count)", self.retry_config, || async {
                product::Entity::find().filter(cond.clone()).count(db).await
            })
            .await
            .map_err(|e| FinituraError::database_operation(format!("Product count failed: {}", e)))?;
            self.count_cache.insert(cache_key, count);
            count
        };

        let db = &self.db;
        let page_offset = page.saturating_sub(1);
        let models = retry::with_retry("list_products(data)", self.retry_config, || async {
            apply_sort(product::Entity::find().filter(condition.clone()), sort)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await
        .map_err(|e| FinituraError::database_operation(format!("Product query failed: {}", e)))?;

        Ok((models, total))
    }

    /// Partial update; returns the updated row, or None when the id is unknown
    pub async fn update_product(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Option<product::Model>> {
        let Some(existing) = self.get_product(id).await? else {
            return Ok(None);
        };

        let mut model = product::ActiveModel {
            id: Set(existing.id),
            name: patch.name.map(Set).unwrap_or(NotSet),
            description: patch.description.map(Set).unwrap_or(NotSet),
            price: patch.price.map(Set).unwrap_or(NotSet),
            category: patch.category.map(Set).unwrap_or(NotSet),
            image_url: patch.image_url.map(Set).unwrap_or(NotSet),
            in_stock: patch.in_stock.map(Set).unwrap_or(NotSet),
            ..Default::default()
        };
        model.updated_at = Set(Utc::now());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| FinituraError::database_operation(format!("Product update failed: {}", e)))?;

        self.invalidate_count_cache();
        Ok(Some(updated))
    }

    /// Returns false when the id is unknown
    pub async fn delete_product(&self, id: &str) -> Result<bool> {
        let result = product::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| FinituraError::database_operation(format!("Product delete failed: {}", e)))?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        self.invalidate_count_cache();
        info!("Product deleted: {}", id);
        Ok(true)
    }

    /// Atomic `SET <stat> = <stat> + 1` on a single product row.
    ///
    /// The database does the arithmetic, so concurrent bumps never lose
    /// updates. Returns the affected row count (0 when the id is unknown).
    pub async fn increment_product_stat(&self, id: &str, stat: ProductStat) -> Result<u64> {
        let column = match stat {
            ProductStat::Views => product::Column::Views,
            ProductStat::Likes => product::Column::Likes,
            ProductStat::Contacts => product::Column::Contacts,
            ProductStat::Shares => product::Column::Shares,
        };

        let db = &self.db;
        let id_owned = id.to_string();
        let result = retry::with_retry(
            &format!("increment_product_stat({}, {})", id, stat.as_ref()),
            self.retry_config,
            || async {
                product::Entity::update_many()
                    .col_expr(column, Expr::col(column).add(1))
                    .filter(product::Column::Id.eq(&id_owned))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            FinituraError::database_operation(format!("Product stat increment failed: {}", e))
        })?;

        Ok(result.rows_affected)
    }

    /// Second-pass lookup used to annotate analytics rankings. Ids with no
    /// surviving product row are simply absent from the result.
    pub async fn get_product_briefs(&self, ids: &[String]) -> Result<Vec<ProductBrief>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().cloned()))
            .select_only()
            .column(product::Column::Id)
            .column(product::Column::Name)
            .column(product::Column::ImageUrl)
            .into_tuple::<(String, String, String)>()
            .all(&self.db)
            .await
            .map_err(|e| FinituraError::database_operation(format!("Product lookup failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, image_url)| ProductBrief {
                id,
                name,
                image_url,
            })
            .collect())
    }
}
