use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use probe::{outcome::Record, process::run_with, Config, Context, Error};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

const TIMEOUT: Duration = Duration::from_millis(300);

/// Book site stand-in. What an id gets depends on `id % 4`:
/// 0 → a book page, 1 → the "no page" tip, 2 → 404, 3 → an answer slower than the timeout.
struct StubSite {
    base_url: String,
    requests: Arc<AtomicUsize>,
}

async fn start_stub() -> StubSite {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));

    tokio::spawn({
        let requests = requests.clone();
        async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let requests = requests.clone();
                tokio::spawn(async move {
                    requests.fetch_add(1, Ordering::SeqCst);
                    let _ = serve(stream).await;
                });
            }
        }
    });

    StubSite {
        base_url: format!("http://{addr}/book.htm?id="),
        requests,
    }
}

async fn serve(mut stream: TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let id: u32 = head
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split("id=").nth(1))
        .and_then(|id| id.parse().ok())
        .unwrap_or(0);

    let (status, body) = match id % 4 {
        0 => (
            "200 OK",
            format!(r#"<html><body><h1 id="book_name">Book {id}</h1></body></html>"#),
        ),
        1 => (
            "200 OK",
            r#"<html><body><p class="tips_des">not found</p></body></html>"#.to_string(),
        ),
        2 => ("404 Not Found", "missing".to_string()),
        _ => {
            tokio::time::sleep(TIMEOUT * 6).await;
            ("200 OK", "too late".to_string())
        }
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

fn test_config(base_url: &str, result_path: &Path, max_id: u32, max_in_flight: usize) -> Config {
    Config {
        base_url: base_url.into(),
        max_id,
        max_in_flight,
        request_timeout: TIMEOUT,
        result_buffer: 16,
        result_path: result_path.to_path_buf(),
        ..Config::default()
    }
}

fn read_records(path: &Path) -> Vec<Record> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn records_every_id_exactly_once() {
    let site = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");

    let ctx = Arc::new(Context::new(test_config(&site.base_url, &path, 40, 4)).unwrap());
    let summary = run_with(ctx.clone()).await.unwrap();

    assert_eq!(summary.dispatched, 40);
    assert_eq!(summary.recorded, 40);
    assert_eq!(summary.succeeded, 10);
    assert_eq!(summary.failed, 30);
    assert_eq!(summary.write_failures, 0);
    assert_eq!(summary.lost, 0);
    assert!(summary.peak_in_flight <= 4);
    assert!(site.requests.load(Ordering::SeqCst) >= 40);

    // Every slot is back, timeouts included.
    assert_eq!(ctx.limiter.in_flight(), 0);
    assert_eq!(ctx.limiter.available(), 4);
    assert_eq!(ctx.barrier.pending(), 0);

    let records = read_records(&path);
    assert_eq!(records.len(), 40);
    let by_id: HashMap<u32, Record> = records.into_iter().map(|r| (r.id, r)).collect();
    assert_eq!(by_id.len(), 40);
    assert!((1..=40).all(|id| by_id.contains_key(&id)));

    // 200 with a book name.
    assert_eq!(
        by_id[&8],
        Record {
            id: 8,
            ok: true,
            book_name: "Book 8".into(),
            reason: String::new(),
        }
    );
    // 200 with the not-found tip.
    assert_eq!(
        by_id[&5],
        Record {
            id: 5,
            ok: false,
            book_name: String::new(),
            reason: "No Page".into(),
        }
    );
    // 404.
    assert_eq!(
        by_id[&6],
        Record {
            id: 6,
            ok: false,
            book_name: String::new(),
            reason: "404 Not Found".into(),
        }
    );
    // Timed out.
    let slow = &by_id[&7];
    assert!(!slow.ok);
    assert!(slow.book_name.is_empty());
    assert!(!slow.reason.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_slot_runs_one_at_a_time() {
    let site = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");

    let ctx = Arc::new(Context::new(test_config(&site.base_url, &path, 6, 1)).unwrap());
    let summary = run_with(ctx.clone()).await.unwrap();

    assert_eq!(summary.recorded, 6);
    assert_eq!(summary.peak_in_flight, 1);
    assert_eq!(ctx.limiter.available(), 1);
}

#[tokio::test]
async fn unwritable_output_aborts_before_dispatch() {
    let site = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("result.json");

    let err = probe::run(test_config(&site.base_url, &path, 20, 4))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OpenOutput { .. }));
    assert!(!path.exists());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(site.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_id_space_writes_an_empty_file() {
    let site = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");

    let summary = probe::run(test_config(&site.base_url, &path, 0, 4))
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 0);
    assert_eq!(summary.recorded, 0);
    assert!(read_records(&path).is_empty());
}
