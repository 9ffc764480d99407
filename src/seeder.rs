// src/seeder.rs
use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::order::OrderStatus;
use crate::models::user::{ROLE_ADMIN, ROLE_MANAGER};

const CATEGORIES: [(&str, &str); 4] = [
    ("Light novel", "light-novel"),
    ("Manga", "manga"),
    ("Novel", "novel"),
    ("Comic", "comic"),
];

const DISCOUNT_CODES: [&str; 4] = ["100000001", "100000002", "100000003", "100000004"];

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    category: usize,
    short_intro: &'static str,
    description: &'static str,
    price: Decimal,
    discount: Decimal,
    quantity: i32,
}

const PRODUCTS: [SeedProduct; 3] = [
    SeedProduct {
        name: "Mừng cậu trở về",
        slug: "mung-cau-tro-ve",
        category: 0,
        short_intro: "Một Kaze hòa đồng, tươi sáng và một Moto giản đơn, nghiêm túc lại là bạn thân từ nhỏ.",
        description: "Dù khi trưởng thành và có những nhóm bạn khác nhau, hai chàng trai vẫn luôn hiểu rõ người kia hơn ai hết.",
        price: dec!(100000),
        discount: dec!(0.1),
        quantity: 10,
    },
    SeedProduct {
        name: "Mừng cậu trở về - Tập 2",
        slug: "mung-cau-tro-ve-tap-2",
        category: 0,
        short_intro: "Tiếp nối câu chuyện của Kaze và Moto.",
        description: "Kaze dần phải thừa nhận tình cảm của mình là thật.",
        price: dec!(100000),
        discount: dec!(0.1),
        quantity: 10,
    },
    SeedProduct {
        name: "Doraemon - Tập 1",
        slug: "doraemon-tap-1",
        category: 1,
        short_intro: "Chú mèo máy đến từ tương lai.",
        description: "Những cuộc phiêu lưu của Nobita và Doraemon.",
        price: dec!(25000),
        discount: Decimal::ZERO,
        quantity: 50,
    },
];

/// Fills an empty database with demo data. Does nothing once any product exists.
#[instrument(skip(pool))]
pub async fn seed_if_empty(pool: &PgPool) -> Result<bool, AppError> {
    let has_products = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products)")
        .fetch_one(pool)
        .await?;
    if has_products {
        info!("Database already has products, skipping seed");
        return Ok(false);
    }

    let now = Utc::now();
    let password_hash = hash_password("admin123")?;

    let mut tx = pool.begin().await?;
    let category_ids = seed_categories(&mut *tx).await?;
    let discount_ids = seed_discounts(&mut *tx, now).await?;
    let product_ids = seed_products(&mut *tx, &category_ids, now).await?;
    seed_order(&mut *tx, &product_ids, discount_ids[0], now).await?;
    seed_admin(&mut *tx, &password_hash).await?;
    tx.commit().await?;

    info!(
        categories = category_ids.len(),
        discounts = discount_ids.len(),
        products = product_ids.len(),
        "Seeded demo data"
    );
    Ok(true)
}

async fn seed_categories(conn: &mut PgConnection) -> Result<Vec<Uuid>, AppError> {
    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for (name, slug) in CATEGORIES {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO categories (id, name, description, url_slug, show_on_menu) VALUES ($1, $2, $2, $3, TRUE)"
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .execute(&mut *conn)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_discounts(conn: &mut PgConnection, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
    let expiry = now.checked_add_months(Months::new(2)).unwrap_or(now + Duration::days(60));

    let mut ids = Vec::with_capacity(DISCOUNT_CODES.len());
    for code in DISCOUNT_CODES {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO discounts (id, name, code, discount_percentage, expiry_date, min_price, quantity, active)
             VALUES ($1, $2, $3, 0.5, $4, 0, 100, TRUE)"
        )
        .bind(id)
        .bind(format!("Giảm 50% ({code})"))
        .bind(code)
        .bind(expiry)
        .execute(&mut *conn)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_products(conn: &mut PgConnection, category_ids: &[Uuid], now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
    let mut ids = Vec::with_capacity(PRODUCTS.len());
    for product in &PRODUCTS {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO products
                (id, category_id, name, short_intro, description, url_slug, price, quantity, discount, active, create_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)"
        )
        .bind(id)
        .bind(category_ids[product.category])
        .bind(product.name)
        .bind(product.short_intro)
        .bind(product.description)
        .bind(product.slug)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.discount)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

/// One order for the first two products, using the first discount code.
async fn seed_order(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
    discount_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let order_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO orders (id, discount_id, first_name, email, ship_address, ship_tel, order_date, status)
         VALUES ($1, $2, 'Phát', '2014478@gmail.com', 'DLU', '012345678', $3, $4)"
    )
    .bind(order_id)
    .bind(discount_id)
    .bind(now)
    .bind(OrderStatus::New.as_str())
    .execute(&mut *conn)
    .await?;

    for (product_id, product) in product_ids.iter().zip(&PRODUCTS).take(2) {
        sqlx::query("INSERT INTO order_details (order_id, product_id, quantity, price) VALUES ($1, $2, 1, $3)")
            .bind(order_id)
            .bind(product_id)
            .bind(product.price)
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE products SET quantity = quantity - 1 WHERE id = $1")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
    }

    sqlx::query("UPDATE discounts SET quantity = quantity - 1 WHERE id = $1")
        .bind(discount_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn seed_admin(conn: &mut PgConnection, password_hash: &str) -> Result<(), AppError> {
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, username, password, phone, address)
         VALUES ($1, 'Admin', 'Admin@gmail.com', 'admin', $2, '0123456789', 'DLU')
         ON CONFLICT (username) DO NOTHING"
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(&mut *conn)
    .await?;

    for role in [ROLE_ADMIN, ROLE_MANAGER] {
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(role)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO user_in_roles (user_id, role_id)
             SELECT u.id, r.id FROM users u, roles r WHERE u.username = 'admin' AND r.name = $1
             ON CONFLICT DO NOTHING"
        )
        .bind(role)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_products_have_unique_slugs_and_valid_ranges() {
        let slugs: HashSet<_> = PRODUCTS.iter().map(|p| p.slug).collect();
        assert_eq!(slugs.len(), PRODUCTS.len());
        for p in &PRODUCTS {
            assert!(crate::slug::is_valid_slug(p.slug), "{}", p.slug);
            assert!(p.category < CATEGORIES.len());
            assert!((Decimal::ZERO..=Decimal::ONE).contains(&p.discount));
            assert!(p.price >= Decimal::ZERO && p.quantity >= 0);
        }
    }

    #[test]
    fn seed_category_slugs_are_valid() {
        for (_, slug) in CATEGORIES {
            assert!(crate::slug::is_valid_slug(slug));
        }
    }
}
