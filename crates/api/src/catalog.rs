//! Products and categories.
//!
//! Reads are cached; every mutation invalidates the list and the record it
//! touched.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use shopfront_core::{Category, CategoryId, CategoryInput, Product, ProductId, ProductInput};

use crate::cache::{CacheKey, CacheValue};
use crate::client::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    /// All products, in backend order.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            return Ok(products);
        }

        let products: Vec<Product> = self.get_list("/products", None).await?;
        tracing::debug!(count = products.len(), "Fetched products");

        self.store(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// A single product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let product: Product = self.get_item(&format!("/products/{id}"), None).await?;

        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &SecretString,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product: Product = self
            .send_item(Method::POST, "/products", Some(token), input)
            .await?;
        self.invalidate(&[CacheKey::Products]).await;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &SecretString,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product: Product = self
            .send_item(Method::PATCH, &format!("/products/{id}"), Some(token), input)
            .await?;
        self.invalidate(&[CacheKey::Products, CacheKey::Product(id)])
            .await;
        tracing::info!("Product updated");
        Ok(product)
    }

    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &SecretString, id: ProductId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/products/{id}"), Some(token))
            .await?;
        self.invalidate(&[CacheKey::Products, CacheKey::Product(id)])
            .await;
        tracing::info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_list("/categories", None).await?;

        self.store(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
        Ok(categories)
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.cached(&key).await {
            return Ok(*category);
        }

        let category: Category = self.get_item(&format!("/categories/{id}"), None).await?;

        self.store(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        token: &SecretString,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category: Category = self
            .send_item(Method::POST, "/categories", Some(token), input)
            .await?;
        self.invalidate(&[CacheKey::Categories]).await;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self, token, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        token: &SecretString,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category: Category = self
            .send_item(
                Method::PATCH,
                &format!("/categories/{id}"),
                Some(token),
                input,
            )
            .await?;
        // Products embed their category name
        self.invalidate(&[
            CacheKey::Categories,
            CacheKey::Category(id),
            CacheKey::Products,
        ])
        .await;
        tracing::info!("Category updated");
        Ok(category)
    }

    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(
        &self,
        token: &SecretString,
        id: CategoryId,
    ) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/categories/{id}"), Some(token))
            .await?;
        self.invalidate(&[
            CacheKey::Categories,
            CacheKey::Category(id),
            CacheKey::Products,
        ])
        .await;
        tracing::info!("Category deleted");
        Ok(())
    }
}
