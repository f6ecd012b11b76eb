//! Sample payloads used as benchmark input.
//!
//! Menu, widget, glossary, weather and jobs are fixed documents. The remaining
//! ones are generated from the run seed so every subject sees identical input and
//! repeated runs with the same seed compare like with like.

use crate::error::BenchError;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

const ROW_COUNT: usize = 64;
const NUMBER_COUNT: usize = 1_024;
const LARGE_COUNT: usize = 2_000;
const LEGISLATOR_COUNT: usize = 540;
const STATUS_COUNT: usize = 100;

const STATES: &[&str] = &[
    "AK", "AZ", "CA", "CO", "FL", "GA", "IL", "MA", "MI", "NY", "OH", "OR", "PA", "TX", "VA", "WA",
];

const WORDS: &[&str] = &[
    "amber", "basalt", "cobalt", "delta", "ember", "fjord", "granite", "harbor", "indigo",
    "juniper", "kelp", "lumen", "meadow", "nickel", "onyx", "prairie", "quartz", "raven",
    "sierra", "tundra", "umber", "vessel", "willow", "xenon", "yarrow", "zephyr",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub value: String,
    pub onclick: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub value: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetWindow {
    pub title: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetImage {
    pub src: String,
    pub name: String,
    pub h_offset: i32,
    pub v_offset: i32,
    pub alignment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetText {
    pub data: String,
    pub size: u32,
    pub style: String,
    pub name: String,
    pub h_offset: i32,
    pub v_offset: i32,
    pub alignment: String,
    pub on_mouse_up: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub debug: bool,
    pub window: WidgetWindow,
    pub image: WidgetImage,
    pub text: WidgetText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossEntry {
    pub id: String,
    pub sort_as: String,
    pub term: String,
    pub acronym: String,
    pub abbrev: String,
    pub definition: String,
    pub see_also: Vec<String>,
    pub see: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glossary {
    pub title: String,
    pub division: String,
    pub entries: Vec<GlossEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub score: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Numbers {
    pub integers: Vec<i64>,
    pub floats: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub row: Row,
    pub history: Vec<f64>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub summary: String,
    pub icon: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_bearing: u16,
    pub precip_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub time: u64,
    pub summary: String,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub sunrise: u64,
    pub sunset: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub currently: Conditions,
    pub daily: Vec<DailyForecast>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub kind: String,
    pub start: String,
    pub end: String,
    pub state: String,
    pub district: Option<u32>,
    pub party: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legislator {
    pub bioguide: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub gender: String,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: u64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jobs {
    pub total: u32,
    pub page: u32,
    pub postings: Vec<JobPosting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
    pub description: String,
    pub followers_count: u32,
    pub friends_count: u32,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub screen_name: String,
    pub indices: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: u64,
    pub created_at: String,
    pub text: String,
    pub user: TwitterUser,
    pub entities: Entities,
    pub retweet_count: u32,
    pub favorite_count: u32,
    pub in_reply_to: Option<u64>,
    pub lang: String,
}

/// A benchmark input value. Every codec adapter handles every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Menu(Menu),
    Widget(Widget),
    Glossary(Glossary),
    Rows(Vec<Row>),
    Weather(Weather),
    Congress(Vec<Legislator>),
    Jobs(Jobs),
    Numbers(Numbers),
    Twitter(Vec<Status>),
    Large(Vec<Record>),
}

/// A named payload. Identity (equality, hashing) is the name alone.
#[derive(Debug, Clone)]
pub struct Case {
    name: String,
    payload: Payload,
}

impl Case {
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl PartialEq for Case {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Case {}

impl Hash for Case {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn per_case_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

fn word(rng: &mut ChaCha8Rng) -> String {
    WORDS.choose(rng).copied().unwrap_or("word").to_string()
}

fn generate_row(rng: &mut ChaCha8Rng, id: u64) -> Row {
    let first = word(rng);
    let last = word(rng);
    let tag_count = rng.gen_range(0..5);
    Row {
        id,
        email: format!("{first}.{last}@example.com"),
        name: format!("{first} {last}"),
        active: rng.gen_bool(0.7),
        score: rng.gen_range(0.0..1_000.0),
        tags: (0..tag_count).map(|_| word(rng)).collect(),
    }
}

fn generate_rows(seed: u64, count: usize) -> Vec<Row> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count as u64).map(|id| generate_row(&mut rng, id)).collect()
}

fn generate_numbers(seed: u64, count: usize) -> Numbers {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Numbers {
        integers: (0..count).map(|_| rng.gen::<i64>()).collect(),
        floats: (0..count).map(|_| rng.gen_range(-1.0e9..1.0e9)).collect(),
    }
}

fn generate_records(seed: u64, count: usize) -> Vec<Record> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count as u64)
        .map(|id| {
            let row = generate_row(&mut rng, id);
            let history = (0..16).map(|_| rng.gen_range(0.0..1.0)).collect();
            let attributes = (0..rng.gen_range(1..6))
                .map(|i| (format!("attr{i}"), word(&mut rng)))
                .collect();
            Record {
                row,
                history,
                attributes,
            }
        })
        .collect()
}

fn generate_legislators(seed: u64, count: usize) -> Vec<Legislator> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let first_name = word(&mut rng);
            let last_name = word(&mut rng);
            let terms = (0..rng.gen_range(1..8))
                .map(|t| {
                    let start = 1_989 + 2 * t;
                    let senate = rng.gen_bool(0.2);
                    Term {
                        kind: if senate { "sen" } else { "rep" }.to_string(),
                        start: format!("{start}-01-03"),
                        end: format!("{}-01-03", start + if senate { 6 } else { 2 }),
                        state: STATES.choose(&mut rng).copied().unwrap_or("DC").to_string(),
                        district: (!senate).then(|| rng.gen_range(1..40)),
                        party: if rng.gen_bool(0.5) { "Democrat" } else { "Republican" }
                            .to_string(),
                    }
                })
                .collect();
            Legislator {
                bioguide: format!("{}{:06}", last_name.chars().next().unwrap_or('X'), i),
                birthday: format!(
                    "{}-{:02}-{:02}",
                    rng.gen_range(1930..1990),
                    rng.gen_range(1..13),
                    rng.gen_range(1..29)
                ),
                gender: if rng.gen_bool(0.5) { "F" } else { "M" }.to_string(),
                first_name,
                last_name,
                terms,
            }
        })
        .collect()
}

fn generate_statuses(seed: u64, count: usize) -> Vec<Status> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count as u64)
        .map(|id| {
            let screen_name = format!("{}_{}", word(&mut rng), rng.gen_range(0..1_000));
            let words: Vec<String> = (0..rng.gen_range(4..20)).map(|_| word(&mut rng)).collect();
            let hashtags: Vec<String> = (0..rng.gen_range(0..3)).map(|_| word(&mut rng)).collect();
            let mentions = (0..rng.gen_range(0..3))
                .map(|_| {
                    let start = rng.gen_range(0..100);
                    Mention {
                        screen_name: word(&mut rng),
                        indices: (start, start + 8),
                    }
                })
                .collect();
            Status {
                id: 1_000_000_000 + id,
                created_at: format!(
                    "Mon Sep 24 {:02}:{:02}:{:02} +0000 2012",
                    rng.gen_range(0..24),
                    rng.gen_range(0..60),
                    rng.gen_range(0..60)
                ),
                text: words.join(" "),
                user: TwitterUser {
                    id: rng.gen(),
                    name: word(&mut rng),
                    description: format!("{} and {}, mostly", word(&mut rng), word(&mut rng)),
                    followers_count: rng.gen_range(0..100_000),
                    friends_count: rng.gen_range(0..5_000),
                    verified: rng.gen_bool(0.05),
                    screen_name,
                },
                entities: Entities {
                    urls: hashtags
                        .iter()
                        .map(|h| format!("https://example.com/t/{h}"))
                        .collect(),
                    hashtags,
                    mentions,
                },
                retweet_count: rng.gen_range(0..500),
                favorite_count: rng.gen_range(0..2_000),
                in_reply_to: rng.gen_bool(0.3).then(|| rng.gen()),
                lang: "en".to_string(),
            }
        })
        .collect()
}

fn menu() -> Menu {
    let item = |value: &str, onclick: &str| MenuItem {
        value: value.to_string(),
        onclick: onclick.to_string(),
    };
    Menu {
        id: "file".to_string(),
        value: "File".to_string(),
        items: vec![
            item("New", "CreateNewDoc()"),
            item("Open", "OpenDoc()"),
            item("Close", "CloseDoc()"),
        ],
    }
}

fn widget() -> Widget {
    Widget {
        debug: true,
        window: WidgetWindow {
            title: "Sample Konfabulator Widget".to_string(),
            name: "main_window".to_string(),
            width: 500,
            height: 500,
        },
        image: WidgetImage {
            src: "Images/Sun.png".to_string(),
            name: "sun1".to_string(),
            h_offset: 250,
            v_offset: 250,
            alignment: "center".to_string(),
        },
        text: WidgetText {
            data: "Click Here".to_string(),
            size: 36,
            style: "bold".to_string(),
            name: "text1".to_string(),
            h_offset: 250,
            v_offset: 100,
            alignment: "center".to_string(),
            on_mouse_up: "sun1.opacity = (sun1.opacity / 100) * 90;".to_string(),
        },
    }
}

fn glossary() -> Glossary {
    Glossary {
        title: "example glossary".to_string(),
        division: "S".to_string(),
        entries: vec![GlossEntry {
            id: "SGML".to_string(),
            sort_as: "SGML".to_string(),
            term: "Standard Generalized Markup Language".to_string(),
            acronym: "SGML".to_string(),
            abbrev: "ISO 8879:1986".to_string(),
            definition: "A meta-markup language, used to create markup languages such as DocBook."
                .to_string(),
            see_also: vec!["GML".to_string(), "XML".to_string()],
            see: Some("markup".to_string()),
        }],
    }
}

fn weather() -> Weather {
    let day = |time: u64, summary: &str, min: f64, max: f64| DailyForecast {
        time,
        summary: summary.to_string(),
        temperature_min: min,
        temperature_max: max,
        sunrise: time + 23_400,
        sunset: time + 66_600,
    };
    Weather {
        latitude: 37.8267,
        longitude: -122.423,
        timezone: "America/Los_Angeles".to_string(),
        currently: Conditions {
            summary: "Partly Cloudy".to_string(),
            icon: "partly-cloudy-day".to_string(),
            temperature: 61.37,
            apparent_temperature: 61.37,
            humidity: 0.72,
            wind_speed: 9.84,
            wind_bearing: 264,
            precip_probability: 0.05,
        },
        daily: vec![
            day(1_420_099_200, "Mostly cloudy throughout the day.", 48.2, 59.9),
            day(1_420_185_600, "Light rain in the morning.", 47.1, 57.3),
            day(1_420_272_000, "Clear throughout the day.", 45.6, 62.8),
            day(1_420_358_400, "Breezy in the afternoon.", 49.0, 64.1),
            day(1_420_444_800, "Partly cloudy overnight.", 50.3, 63.5),
        ],
        alerts: vec!["Small Craft Advisory until 9 PM PST".to_string()],
    }
}

fn jobs() -> Jobs {
    let posting = |id: u64,
                   title: &str,
                   company: &str,
                   location: &str,
                   remote: bool,
                   salary: Option<(u32, u32)>,
                   skills: &[&str]| JobPosting {
        id,
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        remote,
        salary_min: salary.map(|(min, _)| min),
        salary_max: salary.map(|(_, max)| max),
        description: format!("{company} is hiring a {title} to join a small, fast-moving team."),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    };
    Jobs {
        total: 5,
        page: 1,
        postings: vec![
            posting(101, "Backend Engineer", "Acme", "Berlin", false, Some((70_000, 90_000)), &["rust", "postgres"]),
            posting(102, "Site Reliability Engineer", "Globex", "Remote", true, None, &["kubernetes", "terraform", "go"]),
            posting(103, "Data Analyst", "Initech", "Austin", false, Some((60_000, 75_000)), &["sql", "python"]),
            posting(104, "Frontend Developer", "Umbrella", "London", true, Some((55_000, 80_000)), &["typescript", "react", "css"]),
            posting(105, "Embedded Engineer", "Hooli", "Munich", false, None, &["c", "rtos"]),
        ],
    }
}

/// All built-in cases, in reporting order. Generated payloads derive from `seed`.
pub fn catalog(seed: u64) -> Vec<Case> {
    vec![
        Case::new("menu", Payload::Menu(menu())),
        Case::new("widget", Payload::Widget(widget())),
        Case::new("glossary", Payload::Glossary(glossary())),
        Case::new("rows", Payload::Rows(generate_rows(per_case_seed(seed, 3), ROW_COUNT))),
        Case::new("weather", Payload::Weather(weather())),
        Case::new(
            "congress",
            Payload::Congress(generate_legislators(per_case_seed(seed, 5), LEGISLATOR_COUNT)),
        ),
        Case::new("jobs", Payload::Jobs(jobs())),
        Case::new(
            "numbers",
            Payload::Numbers(generate_numbers(per_case_seed(seed, 7), NUMBER_COUNT)),
        ),
        Case::new(
            "twitter",
            Payload::Twitter(generate_statuses(per_case_seed(seed, 8), STATUS_COUNT)),
        ),
        Case::new(
            "large",
            Payload::Large(generate_records(per_case_seed(seed, 9), LARGE_COUNT)),
        ),
    ]
}

/// Pick cases from `all` by name, ignoring ASCII case. An empty filter keeps
/// every case. Repeated names select the case once.
pub fn select(all: Vec<Case>, names: &[String]) -> Result<Vec<Case>, BenchError> {
    if names.is_empty() {
        return Ok(all);
    }
    let mut picked: Vec<Case> = Vec::with_capacity(names.len());
    for name in names {
        let case = all
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| BenchError::InvalidConfig(format!("unknown case: {name}")))?;
        if !picked.contains(case) {
            picked.push(case.clone());
        }
    }
    Ok(picked)
}
