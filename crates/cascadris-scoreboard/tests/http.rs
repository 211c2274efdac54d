use std::{net::SocketAddr, time::Duration};

use cascadris_engine::{NewScore, Scoreboard as _};
use cascadris_scoreboard::{HttpScoreboard, ScoreClient, ScoreStore};

async fn spawn_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(cascadris_scoreboard::serve(
        listener,
        ScoreStore::in_memory(),
        std::future::pending(),
    ));
    addr
}

fn score(name: &str, score: i32) -> NewScore {
    NewScore {
        name: name.to_owned(),
        score,
    }
}

#[tokio::test]
async fn test_client_round_trip() {
    let addr = spawn_server().await;
    let client = ScoreClient::new(&format!("http://{addr}")).unwrap();
    assert!(client.fetch_scores().await.unwrap().is_empty());

    for (name, points) in [("ann", 20), ("bob", 40), ("cat", 20)] {
        client.submit_score(&score(name, points)).await.unwrap();
    }
    let table = client
        .fetch_scores()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.score, r.rank))
        .collect::<Vec<_>>();
    assert_eq!(
        table,
        vec![
            ("bob".to_owned(), 40, 1),
            ("ann".to_owned(), 20, 2),
            ("cat".to_owned(), 20, 2),
        ]
    );
}

#[test]
fn test_blocking_scoreboard_against_live_server() {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            tx.send(spawn_server().await).unwrap();
            std::future::pending::<()>().await;
        });
    });
    let addr = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let url = format!("http://{addr}");

    let scoreboard = HttpScoreboard::new(&url).unwrap();
    assert!(scoreboard.fetch_scores().unwrap().is_empty());
    scoreboard.submit_score(&score("dee", 70)).unwrap();
    // dropping waits for the background submission
    drop(scoreboard);

    let scoreboard = HttpScoreboard::new(&url).unwrap();
    let table = scoreboard.fetch_scores().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].name, "dee");
    assert_eq!(table[0].rank, 1);
}
