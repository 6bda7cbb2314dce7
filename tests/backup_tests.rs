//! Integration tests for the backup crawler
//!
//! These tests use wiremock to stand in for the live site and run the full
//! crawl-merge-persist cycle end-to-end against real backup files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfmirror::crawler::{
    build_fetcher, HttpFetcher, PageFetcher, PaginationCrawler, RetryPolicy, RetryingFetcher,
};
use shelfmirror::{
    merge, BackupStore, Book, DelayBounds, Quote, ReadingStatus, RunConfig, Transport,
};

const EMPTY_PAGE: &str =
    r#"<html><body><div class="with-pad">Страница пуста</div></body></html>"#;
const BOT_PAGE: &str = r#"<html><body><div class="page-404"><h1>404</h1></div></body></html>"#;

fn listing_page(rows: &str) -> String {
    format!(
        r#"<html><body><div id="booklist">{}</div></body></html>"#,
        rows
    )
}

fn book_row(link: &str, name: &str, author: &str) -> String {
    format!(
        r#"<div><div class="brow-data"><div>
             <a class="brow-book-name" href="{}">{}</a>
             <a class="brow-book-author" href="/author/1">{}</a>
           </div></div></div>"#,
        link, name, author
    )
}

fn date_header(text: &str) -> String {
    format!(r#"<div><h2 class="i-h2toggle">{}</h2></div>"#, text)
}

fn quote_card(quote_link: &str, book_link: &str, text: &str) -> String {
    format!(
        r#"<article><div class="lenta-card">
             <a href="{}">link to quote</a>
             <div class="lenta-card-book__wrapper">
               <a class="lenta-card__book-title" href="{}">Quoted Book</a>
               <p class="lenta-card__author-wrap"><a href="/author/2">Quoted Author</a></p>
             </div>
             <blockquote>{}</blockquote>
           </div></article>"#,
        quote_link, book_link, text
    )
}

/// Creates a run configuration pointed at the mock server
fn test_config(server_uri: &str, dir: &Path) -> Arc<RunConfig> {
    Arc::new(RunConfig {
        user: "tester".to_string(),
        profile_url: format!("{}/reader/tester", server_uri),
        delay: DelayBounds {
            min: 0,
            max: Some(0),
        },
        book_page_limit: None,
        quote_page_limit: None,
        books_backup: dir.join("tester_books.csv"),
        quotes_backup: dir.join("tester_quotes.csv"),
        rewrite_all: false,
        skip: None,
        transport: Transport::Http,
    })
}

fn test_crawler(config: Arc<RunConfig>) -> PaginationCrawler {
    let fetcher = build_fetcher(Transport::Http).expect("http client");
    PaginationCrawler::new(config, fetcher, CancellationToken::new()).with_retry_policy(
        RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            backoff: 2.0,
        },
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_book_backup_cycle() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let page = listing_page(&format!(
        "{}{}{}",
        date_header("Январь 2024 г."),
        book_row("/book/1", "First Book", "Author One"),
        book_row("/book/2", "Second Book", "Author Two"),
    ));
    mount_page(&server, "/reader/tester/read/~1", &page).await;
    mount_page(&server, "/reader/tester/read/~2", EMPTY_PAGE).await;

    let config = test_config(&server.uri(), dir.path());
    let crawler = test_crawler(config.clone());

    let books = crawler.crawl_books(ReadingStatus::Read).await;
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].name, "First Book");
    assert_eq!(books[0].date, "2024-01-01");
    assert_eq!(books[1].date, "2024-01-01");

    // First run: everything is new.
    let store = BackupStore::open(&config.books_backup).unwrap();
    let baseline: Vec<Book> = store.read_existing().unwrap();
    let fresh = merge::new_items(&baseline, &books);
    assert_eq!(fresh.len(), 2);
    store.append(&fresh).unwrap();

    // Second run against the same listing: nothing new.
    let books_again = crawler.crawl_books(ReadingStatus::Read).await;
    let baseline: Vec<Book> = store.read_existing().unwrap();
    assert_eq!(baseline.len(), 2);
    assert!(merge::new_items(&baseline, &books_again).is_empty());
}

#[tokio::test]
async fn test_wish_listing_appends_only_new_records() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let page = listing_page(&format!(
        "{}{}",
        book_row("/book/10", "Already Saved", "Author"),
        book_row("/book/11", "Brand New", "Author"),
    ));
    mount_page(&server, "/reader/tester/wish/~1", &page).await;
    mount_page(&server, "/reader/tester/wish/~2", EMPTY_PAGE).await;

    let config = test_config(&server.uri(), dir.path());
    let store = BackupStore::open(&config.books_backup).unwrap();
    store
        .append(&[Book::new(
            "/book/10",
            Some(ReadingStatus::Wish),
            "Already Saved",
            "Author",
            "",
            "",
        )])
        .unwrap();

    let books = test_crawler(config.clone())
        .crawl_books(ReadingStatus::Wish)
        .await;
    assert_eq!(books.len(), 2);

    let baseline: Vec<Book> = store.read_existing().unwrap();
    let fresh = merge::new_items(&baseline, &books);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "Brand New");

    store.append(&fresh).unwrap();
    let all: Vec<Book> = store.read_existing().unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_bot_detection_stops_after_collected_pages() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let page = listing_page(&book_row("/book/1", "Only Book", "Author"));
    mount_page(&server, "/reader/tester/reading/~1", &page).await;
    mount_page(&server, "/reader/tester/reading/~2", BOT_PAGE).await;

    let books = test_crawler(test_config(&server.uri(), dir.path()))
        .crawl_books(ReadingStatus::Reading)
        .await;

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].status, Some(ReadingStatus::Reading));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reader/tester"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reader/tester"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let fetcher = RetryingFetcher::new(
        Arc::new(HttpFetcher::new().unwrap()),
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff: 2.0,
        },
    );

    let body = fetcher
        .fetch(&format!("{}/reader/tester", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html></html>");
}

#[tokio::test]
async fn test_quote_backup_cycle() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let page = format!(
        "<html><body>{}{}</body></html>",
        quote_card("/quote/100", "/book/1", "First quote text."),
        quote_card("/quote/101", "/book/2", "Second quote text."),
    );
    mount_page(&server, "/reader/tester/quotes/~1", &page).await;
    mount_page(&server, "/reader/tester/quotes/~2", EMPTY_PAGE).await;

    let config = test_config(&server.uri(), dir.path());
    let quotes = test_crawler(config.clone()).crawl_quotes().await;
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].text, "First quote text.");
    assert_eq!(quotes[0].book.name, "Quoted Book");
    assert_eq!(quotes[0].book.author, "Quoted Author");

    let store = BackupStore::open(&config.quotes_backup).unwrap();
    let fresh = merge::new_items(&Vec::<Quote>::new(), &quotes);
    store.append(&fresh).unwrap();

    let restored: Vec<Quote> = store.read_existing().unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[1].text, "Second quote text.");
    assert!(merge::new_items(&restored, &quotes).is_empty());
}

#[tokio::test]
async fn test_missing_profile_surfaces_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher
        .fetch(&format!("{}/reader/nobody", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        shelfmirror::FetchError::Status { status: 404, .. }
    ));
}

#[tokio::test]
async fn test_failed_listing_page_does_not_abort_run() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Page 1 always errors; page 2 carries the record; page 3 ends the
    // listing.
    Mock::given(method("GET"))
        .and(path("/reader/tester/wish/~1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let page = listing_page(&book_row("/book/3", "Survivor", "Author"));
    mount_page(&server, "/reader/tester/wish/~2", &page).await;
    mount_page(&server, "/reader/tester/wish/~3", EMPTY_PAGE).await;

    let books = test_crawler(test_config(&server.uri(), dir.path()))
        .crawl_books(ReadingStatus::Wish)
        .await;

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].name, "Survivor");
}
