//! Set properties every [`ReadStateStore`] upholds, checked over generated id sets.
//!
//! Each operation runs as its own request: the store is opened from the medium,
//! used once, and whatever it wrote is carried over to the next request.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::persistent_store::tests::InMemoryMetaStore;
use super::post_id::ids;
use super::{
    CookieReadStateStore, PersistentReadStateStore, PostId, ReadStateCookieSettings,
    ReadStateStore, DEFAULT_READ_POSTS_META_KEY,
};

/// Where the read state of one visitor survives between requests.
enum Medium {
    /// The cookie value the browser sends back, if any.
    Cookie { value: Option<String>, writes: usize },
    Persistent(Arc<InMemoryMetaStore>),
}

impl Medium {
    fn cookie() -> Self {
        Medium::Cookie {
            value: None,
            writes: 0,
        }
    }

    fn persistent() -> Self {
        Medium::Persistent(Arc::new(InMemoryMetaStore::default()))
    }

    fn request<T>(&mut self, op: impl FnOnce(&mut dyn ReadStateStore) -> T) -> T {
        match self {
            Medium::Cookie { value, writes } => {
                let mut store = CookieReadStateStore::from_cookie_value(
                    ReadStateCookieSettings::for_site("Blog"),
                    value.as_deref(),
                );
                let result = op(&mut store);
                for cookie in store.drain_response_cookies() {
                    *writes += 1;
                    *value = Some(cookie.value().to_string()).filter(|v| !v.is_empty());
                }
                result
            }
            Medium::Persistent(meta) => {
                let mut store =
                    PersistentReadStateStore::load(meta.clone(), 1, DEFAULT_READ_POSTS_META_KEY)
                        .unwrap();
                op(&mut store)
            }
        }
    }

    fn writes(&self) -> usize {
        match self {
            Medium::Cookie { writes, .. } => *writes,
            Medium::Persistent(meta) => *meta.writes.lock().unwrap(),
        }
    }

    fn read_ids(&mut self) -> Vec<u64> {
        self.request(|store| store.read_ids())
            .into_iter()
            .map(PostId::get)
            .collect()
    }

    fn mark_read(&mut self, raw: &[i64]) {
        self.request(|store| store.mark_read(&ids(raw))).unwrap()
    }

    fn mark_unread(&mut self, raw: &[i64]) {
        self.request(|store| store.mark_unread(&ids(raw))).unwrap()
    }
}

fn media() -> [(&'static str, Medium); 2] {
    [("cookie", Medium::cookie()), ("persistent", Medium::persistent())]
}

fn id_set() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(1i64..=1_000_000, 1..24).prop_map(|s| s.into_iter().collect())
}

fn sorted(raw: impl IntoIterator<Item = i64>) -> Vec<u64> {
    raw.into_iter()
        .map(|id| id as u64)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

proptest! {
    #[test]
    fn mark_read_is_commutative(a in id_set(), b in id_set()) {
        for ((name, mut a_first), (_, mut b_first)) in media().into_iter().zip(media()) {
            a_first.mark_read(&a);
            a_first.mark_read(&b);
            b_first.mark_read(&b);
            b_first.mark_read(&a);

            let union = sorted(a.iter().chain(b.iter()).copied());
            prop_assert_eq!(&a_first.read_ids(), &union, "{}", name);
            prop_assert_eq!(&b_first.read_ids(), &union, "{}", name);
        }
    }

    #[test]
    fn mark_then_unmark_restores_prior_state(prior in id_set(), a in id_set()) {
        for (name, mut medium) in media() {
            medium.mark_read(&a);
            medium.mark_unread(&a);
            prop_assert!(medium.read_ids().is_empty(), "{}", name);

            medium.mark_read(&prior);
            medium.mark_read(&a);
            medium.mark_unread(&a);
            let expected = sorted(prior.iter().copied().filter(|id| !a.contains(id)));
            prop_assert_eq!(medium.read_ids(), expected, "{}", name);
        }
    }

    #[test]
    fn repeated_mark_read_does_not_write(a in id_set(), b in id_set()) {
        for (name, mut medium) in media() {
            medium.mark_read(&a);
            medium.mark_read(&b);
            let writes = medium.writes();
            let state = medium.read_ids();

            medium.mark_read(&a);
            medium.mark_read(&b);
            prop_assert_eq!(medium.writes(), writes, "{}", name);
            prop_assert_eq!(medium.read_ids(), state, "{}", name);
        }
    }

    #[test]
    fn delete_all_then_reload_is_empty(a in id_set()) {
        for (name, mut medium) in media() {
            medium.mark_read(&a);
            medium.request(|store| store.delete_all()).unwrap();
            prop_assert!(medium.read_ids().is_empty(), "{}", name);
        }
    }
}
