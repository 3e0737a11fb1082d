//! Shared test fixtures: a migrated in-memory database plus seeding helpers.

use axum_test::TestServer;

use crate::api::{build_router, AppState};
use crate::db::repositories::{
    CatalogRepository, CategoryRepository, ProductRepository, SqlxCatalogRepository,
    SqlxCategoryRepository, SqlxProductRepository, SqlxUserRepository, UserRepository,
};
use crate::db::{create_test_pool, migrations, DynDatabasePool};
use crate::models::{Brand, Category, Model, Product, Room, User};

pub struct Fixtures {
    pub pool: DynDatabasePool,
}

/// A fully linked listing: owner, category, brand, model and product
pub struct Listing {
    pub owner: User,
    pub category: Category,
    pub brand: Brand,
    pub model: Model,
    pub product: Product,
}

impl Fixtures {
    pub async fn new() -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        Self { pool }
    }

    /// HTTP test server over the full router, sharing this database
    pub fn server(&self) -> TestServer {
        let app = build_router(AppState::new(self.pool.clone()), "http://localhost:3000");
        TestServer::new(app).expect("Failed to start test server")
    }

    pub async fn user(&self, email: &str) -> User {
        let name = email.split('@').next().unwrap_or(email).to_string();
        SqlxUserRepository::new(self.pool.clone())
            .create(&User::new(name, email.to_string(), None))
            .await
            .expect("Failed to seed user")
    }

    pub async fn category(&self, name: &str) -> Category {
        SqlxCategoryRepository::new(self.pool.clone())
            .create(&Category::new(name.to_string(), None))
            .await
            .expect("Failed to seed category")
    }

    pub async fn brand(&self, name: &str) -> Brand {
        SqlxCatalogRepository::new(self.pool.clone())
            .create_brand(&Brand::new(name.to_string()))
            .await
            .expect("Failed to seed brand")
    }

    pub async fn model(&self, name: &str, brand: &Brand, category: &Category) -> Model {
        SqlxCatalogRepository::new(self.pool.clone())
            .create_model(&Model::new(
                name.to_string(),
                brand.id.clone(),
                category.id.clone(),
            ))
            .await
            .expect("Failed to seed model")
    }

    pub fn product_for(model_id: &str, owner_id: &str, price: f64) -> Product {
        Product::new(
            model_id.to_string(),
            owner_id.to_string(),
            price,
            "Barely used, comes with the original box".to_string(),
            vec!["front.jpg".to_string(), "back.jpg".to_string()],
        )
    }

    /// Seed an iPhone 13 (Apple, Phones) listed by owner@example.com for 25.0
    pub async fn listing(&self) -> Listing {
        let owner = self.user("owner@example.com").await;
        let category = self.category("Phones").await;
        let brand = self.brand("Apple").await;
        let model = self.model("iPhone 13", &brand, &category).await;
        let product = SqlxProductRepository::new(self.pool.clone())
            .create(&Self::product_for(&model.id, &owner.id, 25.0), &Room::new(3600))
            .await
            .expect("Failed to seed product");

        Listing {
            owner,
            category,
            brand,
            model,
            product,
        }
    }
}
