//! Demo rows for an empty database
//!
//! Sales are drawn from a fixed RNG seed so every fresh database holds the
//! same rows.

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};

const SALES_SEED: u64 = 42;
const SALES_COUNT: usize = 20;

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Hans Johannesen", "hj1@example.com", "Berlin"),
    ("Anna Müller", "anna.mueller@example.com", "Munich"),
    ("Lars Schmidt", "lars.schmidt@example.com", "Hamburg"),
    ("Petra Bauer", "petra.bauer@example.com", "Cologne"),
    ("Klaus Meier", "klaus.meier@example.com", "Frankfurt"),
    ("Monika Fischer", "monika.fischer@example.com", "Stuttgart"),
    ("Jan Becker", "jan.becker@example.com", "Dresden"),
    ("Sophie Weber", "sophie.weber@example.com", "Leipzig"),
    ("Tobias Wolf", "tobias.wolf@example.com", "Dortmund"),
    ("Julia Klein", "julia.klein@example.com", "Nuremberg"),
    ("Markus Braun", "markus.braun@example.com", "Bremen"),
    ("Lisa Hoffmann", "lisa.hoffmann@example.com", "Hanover"),
    ("Stefan Richter", "stefan.richter@example.com", "Essen"),
    ("Nina Wolf", "nina.wolf@example.com", "Duisburg"),
    ("Oliver Klein", "oliver.klein@example.com", "Bochum"),
    ("Claudia König", "claudia.koenig@example.com", "Wuppertal"),
    ("Michael Lang", "michael.lang@example.com", "Bonn"),
    ("Sandra Fuchs", "sandra.fuchs@example.com", "Mannheim"),
    ("Peter Weiß", "peter.weiss@example.com", "Karlsruhe"),
    ("Julia Neumann", "julia.neumann@example.com", "Wiesbaden"),
];

const PRODUCTS: &[(&str, &str, f64, i64)] = &[
    ("Laptop Pro 15", "Laptops", 1499.99, 25),
    ("Smartphone X", "Smartphones", 999.99, 50),
    ("Wireless Mouse", "Accessories", 49.99, 150),
    ("Mechanical Keyboard", "Accessories", 89.99, 80),
    ("27\" Monitor", "Displays", 299.99, 40),
    ("USB-C Hub", "Accessories", 29.99, 120),
    ("External SSD 1TB", "Storage", 129.99, 60),
    ("Noise Cancelling Headphones", "Audio", 199.99, 70),
    ("Smartwatch Series 5", "Wearables", 249.99, 35),
    ("Gaming Chair", "Furniture", 159.99, 20),
    ("Bluetooth Speaker", "Audio", 79.99, 90),
    ("Webcam HD", "Accessories", 59.99, 100),
    ("Tablet Plus", "Tablets", 399.99, 45),
    ("Wireless Charger", "Accessories", 39.99, 110),
    ("Fitness Tracker", "Wearables", 99.99, 80),
    ("Smart Light Bulb", "Smart Home", 24.99, 150),
    ("Router X2000", "Networking", 89.99, 60),
    ("Action Camera", "Cameras", 179.99, 40),
    ("E-Reader", "Tablets", 129.99, 55),
    ("Gaming Mouse", "Accessories", 69.99, 7),
];

const EMPLOYEES: &[(&str, &str, (i32, u32, u32))] = &[
    ("Michael Schneider", "Berlin", (2016, 3, 1)),
    ("Laura Hartmann", "Munich", (2017, 7, 15)),
    ("Stefan Neumann", "Hamburg", (2018, 1, 8)),
    ("Eva Klein", "Cologne", (2018, 9, 3)),
    ("Daniel Bauer", "Frankfurt", (2019, 2, 11)),
    ("Sarah Fischer", "Berlin", (2019, 6, 24)),
    ("Tom Wagner", "Stuttgart", (2019, 11, 4)),
    ("Nina Koch", "Munich", (2020, 4, 1)),
    ("Jan Zimmermann", "Hamburg", (2020, 8, 17)),
    ("Lena Wolf", "Dresden", (2021, 1, 5)),
    ("Peter Schulz", "Berlin", (2021, 5, 10)),
    ("Sandra Mayer", "Leipzig", (2021, 10, 1)),
    ("Karl Neumann", "Cologne", (2022, 2, 14)),
    ("Anna Berg", "Frankfurt", (2022, 6, 1)),
    ("Lukas Schmidt", "Munich", (2022, 9, 19)),
    ("Jana Fischer", "Hamburg", (2023, 1, 9)),
    ("Tobias Weber", "Berlin", (2023, 4, 3)),
    ("Isabel Krause", "Stuttgart", (2023, 8, 21)),
    ("Jan Lorenz", "Dresden", (2024, 2, 1)),
    ("Miriam Hoffmann", "Leipzig", (2024, 6, 17)),
];

/// Insert the demo rows unless `customers` already holds data.
///
/// Returns the number of rows inserted across all tables.
pub fn seed_demo_data(conn: &mut Connection) -> rusqlite::Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::debug!(existing, "Database already seeded");
        return Ok(0);
    }

    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let tx = conn.transaction()?;
    let mut inserted = 0;

    for (name, email, city) in CUSTOMERS {
        inserted += tx.execute(
            "INSERT INTO customers (name, email, city, country, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, email, city, "Germany", now],
        )?;
    }

    for (name, category, price, stock) in PRODUCTS {
        inserted += tx.execute(
            "INSERT INTO products (name, category, price, stock, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, category, price, stock, now],
        )?;
    }

    for (name, region, (y, m, d)) in EMPLOYEES {
        let hired = NaiveDate::from_ymd_opt(*y, *m, *d)
            .map(|date| format!("{} 09:00:00", date.format("%Y-%m-%d")))
            .unwrap_or_else(|| now.clone());
        inserted += tx.execute(
            "INSERT INTO employees (name, region, hire_date) VALUES (?1, ?2, ?3)",
            params![name, region, hired],
        )?;
    }

    let mut rng = StdRng::seed_from_u64(SALES_SEED);
    for i in 0..SALES_COUNT {
        let customer = i % CUSTOMERS.len();
        let product = rng.gen_range(0..PRODUCTS.len());
        let employee = rng.gen_range(0..EMPLOYEES.len());
        let quantity: i64 = rng.gen_range(1..=5);
        let total = (PRODUCTS[product].2 * quantity as f64 * 100.0).round() / 100.0;
        let sale_date = NaiveDate::from_ymd_opt(2025, rng.gen_range(1..=6), rng.gen_range(1..=28))
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| now[..10].to_string());

        inserted += tx.execute(
            "INSERT INTO sales (customer_id, product_id, employee_id, quantity, total_amount, sale_date, city) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                (customer + 1) as i64,
                (product + 1) as i64,
                (employee + 1) as i64,
                quantity,
                total,
                sale_date,
                CUSTOMERS[customer].2,
            ],
        )?;
    }

    tx.commit()?;
    tracing::info!(rows = inserted, "Seeded demo data");
    Ok(inserted)
}
