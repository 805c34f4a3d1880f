// tests/signals_range.rs
//
// Built-in signals as a whole:
// - every evaluator stays inside [0, 1] with a valid weight on randomized pages
// - a credible article outscores a shouty clickbait page under the default registry

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use page_credibility::aggregator::{Aggregator, EvaluationSettings};
use page_credibility::page::PageData;
use page_credibility::signals::{self, builtin_signals, default_registry};
use page_credibility::telemetry::{NoopTelemetry, StatsCollector};

const POOL: &[&str] = &[
    "the", "council", "approved", "budget", "Monday", "NASA", "U.S.", "Dr.", "amazing", "awful",
    "terrible", "wonderful", "love", "hate", "damn", "shit", "not", "never", "SHOCKING", "WOW",
    "you", "won't", "believe", "10", "$4.5", "12:30", "a", "an", "hour", "unique", "the",
    "report", "said", "officials", "data", "I", "think", "really", "very", "extremely",
    "analysis", "https://example.org", "co-operation", "don't", "é", "日本",
];

const MARKS: &[&str] = &["", "", "", ".", ".", "!", "?", "!!!", ",", ":"];

fn random_phrase(rng: &mut StdRng, words: usize) -> String {
    let mut out = String::new();
    for i in 0..words {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(POOL[rng.random_range(0..POOL.len())]);
        out.push_str(MARKS[rng.random_range(0..MARKS.len())]);
        if rng.random_bool(0.05) {
            out.push('\n');
        }
    }
    out
}

fn random_page(rng: &mut StdRng) -> PageData {
    let headline = if rng.random_bool(0.2) {
        String::new()
    } else {
        let n = rng.random_range(1..16);
        random_phrase(rng, n)
    };
    let n = rng.random_range(0..400);
    let text = random_phrase(rng, n);
    let url = match rng.random_range(0..4) {
        0 => "https://www.agency.gov/press/1",
        1 => "http://blog.example.com/post",
        2 => "https://news.example.org/a?b=c",
        _ => "not a url",
    };
    let html = format!(
        r#"<html><body><p>{text}</p><a href="https://other.example.net/x">{}</a></body></html>"#,
        text.split_whitespace().next().unwrap_or("link")
    );
    let authors = match rng.random_range(0..3) {
        0 => vec![],
        1 => vec!["Jane Doe".to_string()],
        _ => vec!["https://example.com/staff".to_string(), "1234".to_string()],
    };
    PageData::new(url, html, headline, text, authors)
}

#[test]
fn evaluators_stay_in_unit_interval_on_random_pages() {
    let mut rng = StdRng::seed_from_u64(0x5eed_2024);
    let signals = builtin_signals();
    assert_eq!(signals.len(), 18);

    for round in 0..150 {
        let page = random_page(&mut rng);
        for signal in &signals {
            let score = signal
                .evaluator()
                .evaluate(&page, &NoopTelemetry)
                .unwrap_or_else(|e| panic!("{} failed in round {round}: {e:#}", signal.name()));
            assert!(
                (0.0..=1.0).contains(&score),
                "{} = {score} in round {round} (headline {:?})",
                signal.name(),
                page.headline
            );
            let weight = signal.weight_fn().weight(score, &page);
            assert!(
                weight.is_finite() && weight >= 0.0,
                "{} weight {weight} in round {round}",
                signal.name()
            );
        }
    }
}

#[test]
fn evaluators_tolerate_empty_pages() {
    let page = PageData::with_tokens("https://example.org/", "", "", "", vec![], vec![], vec![]);
    for signal in builtin_signals() {
        let score = signal.evaluator().evaluate(&page, &NoopTelemetry).expect(signal.name());
        assert!((0.0..=1.0).contains(&score), "{} = {score}", signal.name());
    }
}

const CREDIBLE_TEXT: &str = "The regional transport authority confirmed on Tuesday that the revised \
    timetable will add forty extra weekend services across the northern network. The change follows \
    a survey in which a majority of passengers said that evening connections were too infrequent. \
    According to the published survey report, the authority received responses from more than eleven \
    thousand passengers over six weeks. Officials said the additional services would be funded from \
    the existing operating budget. Passenger groups welcomed the announcement but noted that some \
    rural stations will still see only one train every two hours.";

const SPAM_TEXT: &str = "WOW!!! You will NOT believe this!!! This is the most AMAZING and SHOCKING \
    thing ever! Why does nobody talk about it? Are you ready? I hate this damn stupid crap, it is \
    awful and terrible and horrible! I love it! Seriously, what the hell is going on? This shit is \
    CRAZY! Share it NOW before they delete it!!! Can you believe it? Nobody knows why!";

#[tokio::test]
async fn credible_article_outscores_clickbait() {
    let agg = Aggregator::new(default_registry().unwrap(), EvaluationSettings::default());

    let credible = PageData::new(
        "https://www.transport-authority.gov/news/timetable",
        r#"<p>According to the <a href="https://rail-users.org/s">published survey report</a>.</p>"#,
        "Regional rail timetable adds weekend services",
        CREDIBLE_TEXT,
        vec!["Maria Lindqvist".to_string()],
    );
    let spam = PageData::new(
        "https://viral-stuff.example.com/wow",
        "<p>spam</p>",
        "You Won't Believe What This SHOCKING Trick Does!",
        SPAM_TEXT,
        vec![],
    );

    let good = agg.evaluate(Some(credible)).await.expect("credible page scores");
    let bad = agg.evaluate(Some(spam)).await.expect("spam page scores");
    assert!(
        good.score > bad.score,
        "credible {} should beat spam {}",
        good.score,
        bad.score
    );

    for name in [
        signals::AUTHORS,
        signals::URL_DOMAIN_ENDING,
        signals::EXCLAMATIONS_TEXT,
        signals::CLICKBAIT,
    ] {
        assert!(
            good.sub_scores.get(name) > bad.sub_scores.get(name),
            "{name}: {:?} vs {:?}",
            good.sub_scores.get(name),
            bad.sub_scores.get(name)
        );
    }
}

#[tokio::test]
async fn telemetry_rows_cover_raw_measurements() {
    let stats = std::sync::Arc::new(StatsCollector::new());
    let agg = Aggregator::new(default_registry().unwrap(), EvaluationSettings::default())
        .with_telemetry(stats.clone());
    let page = PageData::new(
        "https://news.example.org/rail",
        "<p></p>",
        "Regional rail timetable adds weekend services",
        CREDIBLE_TEXT,
        vec![],
    );
    agg.evaluate(Some(page)).await.expect("scored");

    let row = stats.row("https://news.example.org/rail");
    let fields: Vec<&str> = row.iter().map(|(f, _)| f.as_str()).collect();
    for name in default_registry().unwrap().names() {
        let key = format!("score_{name}");
        assert!(fields.contains(&key.as_str()), "missing {key} in {fields:?}");
    }
    assert!(fields.contains(&"credibility_score"));
}
