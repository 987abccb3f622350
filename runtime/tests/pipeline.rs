//! End-to-end run against a local stats server.

use statscrawl::acquisition::HttpClient;
use statscrawl::cartography::rate_limiter::PacingConfig;
use statscrawl::config::{Config, RecordSource, SeasonPlan};
use statscrawl::driver::{Driver, Job, TaskOutcome};
use statscrawl::types::Category;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches when the raw query string contains `needle`.
struct QueryContains(&'static str);

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().is_some_and(|q| q.contains(self.0))
    }
}

const STATS_PATH: &str = "/ci/engine/stats/index.html";
const RESULTS_PATH: &str = "/ci/engine/team/1.html";

fn stats_page(player_prefix: &str, rows: usize) -> String {
    let mut html = String::from(
        "<html><body><table><tr><td>Filter</td></tr></table><table class=\"engineTable\"><tr>\
         <th>Player</th><th>Mat</th><th>Inns</th><th>Overs</th><th>Wkts</th><th>BBI</th></tr>",
    );
    for i in 0..rows {
        html.push_str(&format!(
            "<tr><td>{player_prefix} {i}</td><td>14</td><td>14</td><td>52.0</td><td>{}</td>\
             <td> 4/22 </td></tr>",
            10 + i
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn results_page(rows: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><table><tr><td>Result</td><td>Opposition</td></tr>");
    for r in rows {
        html.push_str(&format!("<tr><td>won</td><td>{r}</td></tr>"));
    }
    html.push_str("</table>");
    if let Some(href) = next {
        html.push_str(&format!("<a href=\"{href}\">Next page</a>"));
    }
    html.push_str("</body></html>");
    html
}

async fn mount(server: &MockServer, route: &'static str, query: &'static str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(QueryContains(query))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_builds_dataset() {
    let server = MockServer::start().await;

    // 2015 bowling only answers to the range form.
    mount(&server, STATS_PATH, "season=2015;", stats_page("nobody", 0)).await;
    mount(&server, STATS_PATH, "season=2015%2F16;", stats_page("Bowler", 7)).await;
    // 2016 bowling answers to the plain year.
    mount(&server, STATS_PATH, "season=2016;", stats_page("Seamer", 9)).await;

    mount(
        &server,
        RESULTS_PATH,
        "page=1",
        results_page(&["v Mumbai", "v Delhi"], Some("/ci/engine/team/1.html?page=2")),
    )
    .await;
    mount(
        &server,
        RESULTS_PATH,
        "page=2",
        results_page(&["v Punjab"], Some("/ci/engine/team/1.html?page=1")),
    )
    .await;

    let mut config = Config {
        pacing: PacingConfig::none(),
        seasons: SeasonPlan {
            start: 2015,
            end: 2016,
            categories: vec![Category::Bowling],
        },
        records: vec![RecordSource {
            category: Category::TeamResults,
            url: format!("{}{RESULTS_PATH}?page=1", server.uri()),
        }],
        ..Config::default()
    };
    config.template.base_url = format!("{}{STATS_PATH}", server.uri());

    let mut jobs = Job::seasons(&config.seasons);
    jobs.extend(Job::records(&config.records));

    let fetcher = Arc::new(HttpClient::new("statscrawl-test").unwrap());
    let report = Driver::new(fetcher, &config).run(&jobs).await;
    assert!(report.fatal.is_none());

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.count("extracted"), 3);
    assert!(report.consolidation.empty_categories.is_empty());

    let dataset = &report.consolidation.dataset;
    let bowling_2015 = dataset.table(&Category::Bowling, "2015").unwrap();
    assert_eq!(bowling_2015.len(), 7);
    assert_eq!(bowling_2015.value(0, "Player"), Some("Bowler 0"));
    assert_eq!(bowling_2015.value(0, "BBI"), Some("4/22"));
    assert_eq!(dataset.table(&Category::Bowling, "2016").unwrap().len(), 9);

    let results = dataset.table(&Category::TeamResults, "all").unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.value(2, "Opposition"), Some("v Punjab"));

    let json = serde_json::to_value(dataset).unwrap();
    assert_eq!(json["bowling"]["2016"]["rows"][0]["Player"], "Seamer 0");
    assert_eq!(json["bowling"]["2016"]["text_fields"][0], "BBI");
    assert_eq!(json["team_results"]["all"]["fields"][1], "Opposition");
    assert_eq!(json["team_results"]["all"]["rows"][1]["Result"], "won");
}

#[tokio::test]
async fn test_unreachable_pages_are_reported_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = Config {
        pacing: PacingConfig::none(),
        seasons: SeasonPlan {
            start: 2019,
            end: 2019,
            categories: vec![Category::Fielding],
        },
        records: Vec::new(),
        ..Config::default()
    };
    config.template.base_url = format!("{}{STATS_PATH}", server.uri());

    let fetcher = Arc::new(HttpClient::new("statscrawl-test").unwrap());
    let report = Driver::new(fetcher, &config)
        .run(&Job::seasons(&config.seasons))
        .await;

    assert!(report.fatal.is_none());
    assert_eq!(report.count("aborted"), 1);
    assert!(matches!(
        &report.results[0].outcome,
        TaskOutcome::Aborted { reason, .. } if reason.contains("503")
    ));
    assert!(report.consolidation.dataset.is_empty());
    assert_eq!(report.consolidation.empty_categories, vec![Category::Fielding]);
}
