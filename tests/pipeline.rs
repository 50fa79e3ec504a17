mod pipeline {
    #![allow(non_snake_case)]

    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    use urlsweep::config::Config;
    use urlsweep::scan::{
        AliveOptions, ConcurrencyPolicy, Dispatcher, FetchSettings, Fetcher, HarvestOptions,
        HttpFetcher, ProbeOptions, RuleSet, run_alive, run_harvest, run_probe,
    };

    use std::collections::BTreeSet;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn fetcher(timeout_secs: u64) -> Arc<dyn Fetcher> {
        let settings = FetchSettings {
            timeout: Duration::from_secs(timeout_secs),
            ..Default::default()
        };
        Arc::new(HttpFetcher::new(&settings).unwrap())
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(ConcurrencyPolicy::default())
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Accepts connections and never answers.
    async fn silent_listener() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_harvest__single_tracked_link() -> TestResult {
        let mut server = Server::new_async().await;
        let _a = server
            .mock("GET", "/a")
            .with_body(r#"<html><a href="https://github.com/foo">me</a></html>"#)
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b")
            .with_body("<html><p>nothing to see</p></html>")
            .create_async()
            .await;

        let dir = TempDir::new()?;
        let options = HarvestOptions {
            output: dir.path().join("links.txt"),
            audit: Some(dir.path().join("audit.txt")),
            keep_pages: None,
        };
        let targets = vec![server.url() + "/a", server.url() + "/b"];

        let report = run_harvest(
            targets,
            fetcher(5),
            RuleSet::from_config(&Config::default())?,
            options,
            &dispatcher(),
        )
        .await;

        assert_eq!(report.stats.matched, 1);
        assert_eq!(report.stats.unmatched, 1);
        assert_eq!(report.stats.failed, 0);
        assert_eq!(lines(&dir.path().join("links.txt")), vec!["https://github.com/foo"]);

        let audit = std::fs::read_to_string(dir.path().join("audit.txt"))?;
        assert_eq!(
            audit,
            format!(
                "Downloaded URL: {}/a\nFiltered links: https://github.com/foo\n\n",
                server.url()
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__only_echoing_endpoint_is_found() -> TestResult {
        let mut server = Server::new_async().await;
        let marker = "bugbountytestingxyz";

        let _put = server
            .mock("PUT", Matcher::Any)
            .with_status(201)
            .create_async()
            .await;
        let _echo = server
            .mock("GET", "/bugbountytesting.txt")
            .with_body(marker)
            .create_async()
            .await;
        let _upload = server
            .mock("GET", "/upload/bugbountytesting.txt")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;
        let _json = server
            .mock("GET", "/bugbountytesting.json")
            .with_status(404)
            .create_async()
            .await;

        let dir = TempDir::new()?;
        let config = Config::default();
        let options = ProbeOptions {
            output: dir.path().join("results.txt"),
            endpoints: config.endpoints(),
            marker: config.marker(),
        };

        let report = run_probe(vec![server.url()], fetcher(5), options, &dispatcher()).await;

        assert_eq!(report.stats.total(), 3);
        assert_eq!(report.stats.matched, 1);
        assert_eq!(report.stats.unmatched, 2);
        assert_eq!(
            lines(&dir.path().join("results.txt")),
            vec![format!("{}/bugbountytesting.txt", server.url())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__put_failure_is_counted_as_failed() -> TestResult {
        let addr = silent_listener().await;
        let dir = TempDir::new()?;
        let options = ProbeOptions {
            output: dir.path().join("results.txt"),
            endpoints: vec!["/a.txt".to_string(), "/b.json".to_string()],
            marker: "m".to_string(),
        };

        let report = run_probe(vec![format!("http://{addr}")], fetcher(1), options, &dispatcher()).await;

        assert_eq!(report.stats.failed, 2);
        assert!(lines(&dir.path().join("results.txt")).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_alive__keeps_only_200() -> TestResult {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("HEAD", "/ok")
            .with_status(200)
            .create_async()
            .await;
        let _missing = server
            .mock("HEAD", "/missing")
            .with_status(404)
            .create_async()
            .await;
        let slow = silent_listener().await;

        let dir = TempDir::new()?;
        let options = AliveOptions {
            output: dir.path().join("alive.txt"),
            excluded_extensions: Config::default().excluded_extensions(),
        };
        let targets = vec![
            server.url() + "/ok",
            server.url() + "/missing",
            format!("http://{slow}/hang"),
            server.url() + "/logo.png",
        ];

        let started = Instant::now();
        let report = run_alive(targets, fetcher(1), options, &dispatcher()).await;

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(report.stats.matched, 1);
        assert_eq!(report.stats.unmatched, 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(lines(&dir.path().join("alive.txt")), vec![server.url() + "/ok"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_input__no_tasks_and_empty_outputs() -> TestResult {
        let dir = TempDir::new()?;
        let options = HarvestOptions {
            output: dir.path().join("links.txt"),
            audit: None,
            keep_pages: None,
        };

        let report = run_harvest(
            Vec::new(),
            fetcher(1),
            RuleSet::from_config(&Config::default())?,
            options,
            &dispatcher(),
        )
        .await;

        assert_eq!(report.stats.total(), 0);
        assert_eq!(report.sinks.len(), 1);
        assert_eq!(report.sinks[0].records_written, 0);
        assert_eq!(std::fs::read_to_string(dir.path().join("links.txt"))?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_harvest__repeated_runs_produce_same_lines() -> TestResult {
        let mut server = Server::new_async().await;
        let mut targets = Vec::new();
        let mut mocks = Vec::new();
        for i in 0..8 {
            let body = format!(
                "<a href='https://twitter.com/u{i}'>t</a> <a href=\"https://t.me/c{i}\">c</a>"
            );
            mocks.push(
                server
                    .mock("GET", format!("/p{i}").as_str())
                    .with_body(body)
                    .expect_at_least(1)
                    .create_async()
                    .await,
            );
            targets.push(format!("{}/p{i}", server.url()));
        }

        let dir = TempDir::new()?;
        let mut runs = Vec::new();
        for run in 0..2 {
            let output = dir.path().join(format!("links-{run}.txt"));
            let options = HarvestOptions {
                output: output.clone(),
                audit: None,
                keep_pages: None,
            };
            let report = run_harvest(
                targets.clone(),
                fetcher(5),
                RuleSet::from_config(&Config::default())?,
                options,
                &dispatcher(),
            )
            .await;
            assert_eq!(report.stats.matched, 8);
            runs.push(lines(&output).into_iter().collect::<BTreeSet<_>>());
        }

        assert_eq!(runs[0].len(), 16);
        assert_eq!(runs[0], runs[1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unbounded_policy__every_item_has_an_outcome() -> TestResult {
        let mut server = Server::new_async().await;
        let _any = server
            .mock("HEAD", Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let dir = TempDir::new()?;
        let options = AliveOptions {
            output: dir.path().join("alive.txt"),
            excluded_extensions: Vec::new(),
        };
        let targets: Vec<String> = (0..40).map(|i| format!("{}/item{i}", server.url())).collect();

        let report = run_alive(
            targets,
            fetcher(5),
            options,
            &Dispatcher::new(ConcurrencyPolicy::unbounded()),
        )
        .await;

        assert_eq!(report.stats.total(), 40);
        assert_eq!(report.stats.matched, 40);
        assert_eq!(lines(&dir.path().join("alive.txt")).len(), 40);
        Ok(())
    }
}
