//! Integration tests for the scrape and load pipeline
//!
//! These tests use wiremock to serve listing pages and run the full
//! scrape -> staging -> load -> query cycle end-to-end.

use discount_harvest::config::{
    Config, ListingConfig, SelectorConfig, StorageConfig, UserAgentConfig,
};
use discount_harvest::staging::{read_staged, write_staged};
use discount_harvest::storage::{Catalog, ListingQuery, QueryService, SqliteCatalog};
use discount_harvest::{DiscountRecord, HarvestError, StopReason};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, dir: &TempDir, max_pages: u32) -> Config {
    Config {
        listing: ListingConfig {
            base_url: format!("{}/?page=", server.uri()),
            max_pages,
            page_delay_ms: 0,
            request_timeout_secs: 5,
        },
        selectors: SelectorConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/bot".to_string(),
        },
        storage: StorageConfig {
            staging_path: dir.path().join("discounts.csv").display().to_string(),
            database_path: dir.path().join("discounts.db").display().to_string(),
        },
    }
}

/// One product card; `badge` controls whether it is discounted
fn product_card(name: &str, price: &str, old_price: Option<&str>, badge: Option<&str>) -> String {
    let old = old_price
        .map(|p| format!(r#" data-oprc="{}""#, p))
        .unwrap_or_default();
    let badge = badge
        .map(|b| format!(r#"<div class="bdg _dsct _sm">{}</div>"#, b))
        .unwrap_or_default();
    format!(
        r#"<article class="prd _fb col c-prd"><a class="core" href="/item">
            <div class="info"><div class="name">{}</div>
            <div class="prc"{}>{}</div><div class="s-prc-w">{}</div></div>
        </a></article>"#,
        name, old, price, badge
    )
}

fn listing_page(cards: &[String]) -> String {
    format!(
        r#"<html><head><title>Listing</title></head><body>
        <section class="card -fh"><div class="-paxs row _no-g _4cl-3cm-shs">{}</div></section>
        </body></html>"#,
        cards.join("\n")
    )
}

fn empty_page() -> String {
    listing_page(&[])
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn requested_pages(server: &MockServer) -> Vec<u32> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|req| {
            req.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}

fn row_count(database_path: &str) -> u64 {
    let catalog = SqliteCatalog::open(Path::new(database_path)).expect("Failed to open DB");
    catalog.ensure_table().expect("Failed to ensure table");
    catalog.count_rows().expect("Failed to count rows")
}

#[tokio::test]
async fn test_only_badged_items_are_staged() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        listing_page(&[
            product_card("Blender 1.5L", "KSh 2,499", Some("KSh 3,250"), Some("23%")),
            product_card("Plain Toaster", "KSh 1,000", Some("KSh 1,000"), None),
        ]),
    )
    .await;
    mount_page(&server, 2, empty_page()).await;

    let config = create_test_config(&server, &dir, 25);
    let report = discount_harvest::scrape(&config).await.expect("Scrape failed");

    assert_eq!(report.staged, 1);
    assert!(!report.is_partial());

    let staged = read_staged(Path::new(&config.storage.staging_path)).unwrap();
    assert_eq!(
        staged,
        vec![DiscountRecord {
            product_name: "Blender 1.5L".to_string(),
            price_before_discount: "KSh 3,250".to_string(),
            price_after_discount: "KSh 2,499".to_string(),
            discount_label: "23%".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_empty_page_stops_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        listing_page(&[product_card("Iron", "KSh 1,500", Some("KSh 2,000"), Some("25%"))]),
    )
    .await;
    mount_page(
        &server,
        2,
        listing_page(&[product_card("Fan", "KSh 3,000", None, Some("10%"))]),
    )
    .await;
    mount_page(&server, 3, empty_page()).await;
    mount_page(
        &server,
        4,
        listing_page(&[product_card("Never", "KSh 1", None, Some("99%"))]),
    )
    .await;

    let config = create_test_config(&server, &dir, 25);
    let report = discount_harvest::scrape(&config).await.expect("Scrape failed");

    assert!(matches!(report.stop, StopReason::EmptyPage { page: 3 }));
    assert_eq!(report.staged, 2);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(requested_pages(&server).await, vec![1, 2, 3]);

    let staged = read_staged(Path::new(&config.storage.staging_path)).unwrap();
    let names: Vec<&str> = staged.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(names, vec!["Iron", "Fan"]);
    assert_eq!(staged[1].price_before_discount, "No old price");
}

#[tokio::test]
async fn test_page_ceiling_is_never_exceeded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Every page has content, so only the ceiling can stop the run
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            product_card("Repeating Deal", "KSh 50", Some("KSh 100"), Some("50%")),
        ])))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir, 25);
    let report = discount_harvest::scrape(&config).await.expect("Scrape failed");

    assert!(matches!(report.stop, StopReason::Ceiling));
    assert_eq!(report.pages_fetched, 25);
    assert_eq!(report.staged, 25);

    let pages = requested_pages(&server).await;
    assert_eq!(pages.len(), 25);
    assert_eq!(pages.iter().max(), Some(&25));
    assert!(!pages.contains(&26));
}

#[tokio::test]
async fn test_fetch_error_keeps_earlier_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        listing_page(&[product_card("Kettle", "KSh 900", Some("KSh 1,200"), Some("25%"))]),
    )
    .await;
    mount_page(
        &server,
        2,
        listing_page(&[
            product_card("Mixer", "KSh 4,000", Some("KSh 5,000"), Some("20%")),
            product_card("Spoon", "KSh 50", None, None),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir, 25);
    let report = discount_harvest::scrape(&config).await.expect("Scrape failed");

    assert!(report.is_partial());
    match &report.stop {
        StopReason::FetchError(e) => assert_eq!(e.page(), 3),
        other => panic!("unexpected stop reason: {}", other),
    }
    assert_eq!(report.staged, 2);
    assert_eq!(requested_pages(&server).await, vec![1, 2, 3]);

    let staged = read_staged(Path::new(&config.storage.staging_path)).unwrap();
    let names: Vec<&str> = staged.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(names, vec!["Kettle", "Mixer"]);
}

#[tokio::test]
async fn test_scrape_then_load_round_trip() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        listing_page(&[
            product_card("Phone", "KSh 9,999", Some("KSh 12,999"), Some("23%")),
            product_card("Case", "KSh 499", Some("KSh 999"), Some("50%")),
            product_card("Cable", "KSh 299", None, Some("7%")),
        ]),
    )
    .await;
    mount_page(&server, 2, empty_page()).await;

    let config = create_test_config(&server, &dir, 25);
    let report = discount_harvest::scrape(&config).await.expect("Scrape failed");
    let rows = discount_harvest::load(&config).expect("Load failed");

    assert_eq!(rows, report.staged);
    assert_eq!(rows, 3);
    assert_eq!(row_count(&config.storage.database_path), 3);

    // A second load appends the same snapshot again
    discount_harvest::load(&config).expect("Second load failed");
    assert_eq!(row_count(&config.storage.database_path), 6);
}

#[tokio::test]
async fn test_failed_load_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 25);

    // Seed the catalog and arm a trigger that rejects one specific row
    {
        let mut catalog = SqliteCatalog::open(Path::new(&config.storage.database_path)).unwrap();
        catalog.ensure_table().unwrap();
        catalog
            .append_records(&[DiscountRecord {
                product_name: "Existing".to_string(),
                price_before_discount: "KSh 10".to_string(),
                price_after_discount: "KSh 9".to_string(),
                discount_label: "10%".to_string(),
            }])
            .unwrap();
        catalog
            .connection()
            .execute_batch(
                r#"CREATE TRIGGER reject_last BEFORE INSERT ON discountedproducts
                   WHEN NEW."Product Name" = 'Last'
                   BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"#,
            )
            .unwrap();
    }

    let staged: Vec<DiscountRecord> = ["First", "Second", "Third", "Last"]
        .iter()
        .map(|name| DiscountRecord {
            product_name: name.to_string(),
            price_before_discount: "KSh 100".to_string(),
            price_after_discount: "KSh 80".to_string(),
            discount_label: "20%".to_string(),
        })
        .collect();
    write_staged(Path::new(&config.storage.staging_path), &staged).unwrap();

    let before = row_count(&config.storage.database_path);
    let result = discount_harvest::load(&config);

    assert!(matches!(result, Err(HarvestError::Load(_))));
    assert_eq!(row_count(&config.storage.database_path), before);
}

#[tokio::test]
async fn test_loaded_catalog_sorts_by_numeric_discount() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        listing_page(&[
            product_card("Seven Off", "KSh 93", Some("KSh 100"), Some("7%")),
            product_card("Fifteen Off", "KSh 85", Some("KSh 100"), Some("15%")),
        ]),
    )
    .await;
    mount_page(&server, 2, empty_page()).await;

    let config = create_test_config(&server, &dir, 25);
    discount_harvest::scrape(&config).await.expect("Scrape failed");
    discount_harvest::load(&config).expect("Load failed");

    let service = QueryService::open(Path::new(&config.storage.database_path)).unwrap();
    let page = service.search(&ListingQuery::default()).unwrap();

    let labels: Vec<&str> = page.rows.iter().map(|r| r.discount_label.as_str()).collect();
    assert_eq!(labels, vec!["15%", "7%"]);
    assert_eq!(page.total_products, 2);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_load_without_staging_file_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 25);

    let result = discount_harvest::load(&config);
    assert!(matches!(result, Err(HarvestError::Staging(_))));
}

#[tokio::test]
async fn test_bad_selector_is_config_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir, 25);
    config.selectors.item = "article[".to_string();

    let result = discount_harvest::scrape(&config).await;

    assert!(matches!(result, Err(HarvestError::Config(_))));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    assert!(!Path::new(&config.storage.staging_path).exists());
}
