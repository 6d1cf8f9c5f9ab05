use rand::Rng;

/// Produces the fake headline/body pairs used by the admin generate endpoint.
pub trait ContentGenerator: Send + Sync {
    fn headline(&self) -> String;
    fn body(&self) -> String;
}

const HEADLINE_WORDS: usize = 6;
const MAX_BODY_CHARS: usize = 300;

const WORDS: &[&str] = &[
    "council", "market", "report", "minister", "city", "budget", "election",
    "committee", "deal", "port", "railway", "festival", "museum", "harvest",
    "storm", "bridge", "airport", "league", "summit", "reform", "survey",
    "strike", "exhibit", "quarter", "region", "union", "academy", "plant",
    "announces", "approves", "expands", "delays", "opens", "reviews",
    "launches", "confirms", "rejects", "reaches", "records", "unveils",
];

/// Word-salad generator in the spirit of the usual lorem/faker fillers:
/// a short capitalized headline and a body capped at 300 characters.
pub struct LoremGenerator;

fn pick(rng: &mut impl Rng) -> &'static str {
    WORDS[rng.gen_range(0..WORDS.len())]
}

/// `count` random words, first one capitalized.
fn phrase(rng: &mut impl Rng, count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        let word = pick(rng);
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out
}

impl ContentGenerator for LoremGenerator {
    fn headline(&self) -> String {
        phrase(&mut rand::thread_rng(), HEADLINE_WORDS)
    }

    fn body(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut out = String::new();
        loop {
            let count = rng.gen_range(8..=14);
            let mut next = phrase(&mut rng, count);
            next.push('.');
            if !out.is_empty() && out.len() + next.len() + 1 > MAX_BODY_CHARS {
                break;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&next);
        }
        out
    }
}
