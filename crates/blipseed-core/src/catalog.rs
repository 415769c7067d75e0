//! Embedded name catalogue and interest vocabulary.
//!
//! The catalogue size is the pool capacity: a request for more users than
//! there are names is clamped down to [`USERNAMES.len()`](USERNAMES).

/// Names handed out to identities in order; index `i` is always `USERNAMES[i]`.
pub const USERNAMES: [&str; 100] = [
    "acorn", "alpenglow", "amber", "ash", "aurora", "banyan", "bayou", "bramble", "brook",
    "buttercup", "canto", "cascade", "cedar", "clover", "coral", "cypress", "dawn", "dewdrop",
    "dovetail", "driftwood", "elm", "ember", "evergreen", "fern", "fjord", "flint", "foxglove",
    "gale", "glacier", "gossamer", "grove", "harbor", "harvest", "heather", "horizon", "indigo",
    "iris", "isla", "jade", "jasmine", "junco", "juniper", "kelp", "kestrel", "kite", "koa",
    "lagoon", "laurel", "lilac", "lumen", "marigold", "mesa", "mistral", "moonstone", "nectar",
    "nimbus", "nori", "nova", "oak", "ochre", "onyx", "opal", "pebble", "peony", "poppy",
    "prairie", "quartz", "quasar", "quill", "quince", "reed", "river", "rosemary", "rune", "sage",
    "sable", "solstice", "spruce", "thatch", "thistle", "tamarind", "tundra", "umbra", "umber",
    "upland", "urn", "vale", "vernal", "verve", "violet", "wadi", "willow", "wren", "xanadu",
    "xenia", "xylem", "yarrow", "yonder", "yosemite", "zephyr",
];

/// Interest tags; each identity draws two distinct tags.
pub const INTERESTS: [&str; 16] = [
    "tech",
    "sports",
    "music",
    "movies",
    "gaming",
    "art",
    "science",
    "finance",
    "health",
    "travel",
    "food",
    "nature",
    "politics",
    "crypto",
    "fashion",
    "photography",
];

/// Probability that an identity is flagged as an influencer.
pub const INFLUENCER_RATE: f64 = 0.005;

/// Default probability that an identity is flagged as a bot.
pub const DEFAULT_BOT_RATE: f64 = 0.0;

/// Smallest population the generator will build.
pub const MIN_USERS: usize = 2;

/// Number of identities the catalogue can supply.
#[must_use]
pub const fn pool_capacity() -> usize {
    USERNAMES.len()
}

/// Email address recorded for a catalogue name.
#[must_use]
pub fn email_for(username: &str) -> String {
    format!("{username}@example.com")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn usernames_are_unique() {
        let unique: HashSet<_> = USERNAMES.iter().collect();
        assert_eq!(unique.len(), USERNAMES.len());
    }

    #[test]
    fn interests_are_unique() {
        let unique: HashSet<_> = INTERESTS.iter().collect();
        assert_eq!(unique.len(), INTERESTS.len());
    }

    #[test]
    fn capacity_matches_catalogue() {
        assert_eq!(pool_capacity(), 100);
        assert_eq!(email_for("wren"), "wren@example.com");
    }
}
