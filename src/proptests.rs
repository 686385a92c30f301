use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Reference model: scan every stored prefix.
fn model_longest_match<'a, V>(model: &'a BTreeMap<BitString, V>, key: &BitString) -> Option<&'a V> {
    model
        .iter()
        .filter(|(prefix, _)| key.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, v)| v)
}

/// All keys of exactly `len` bits.
fn all_keys(len: usize) -> impl Iterator<Item = BitString> {
    (0..1u32 << len).map(move |k| {
        BitString::from_u32(k.checked_shl((32 - len) as u32).unwrap_or(0), len)
    })
}

fn prefix_strategy() -> impl Strategy<Value = BitString> {
    prop::collection::vec(any::<bool>(), 0..=12).prop_map(BitString::from_bools)
}

fn key_strategy() -> impl Strategy<Value = BitString> {
    prop::collection::vec(any::<bool>(), 0..=16).prop_map(BitString::from_bools)
}

fn bools_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..=200)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Insert(#[proptest(strategy = "prefix_strategy()")] BitString, u16),
    #[proptest(weight = 2)]
    Lookup(#[proptest(strategy = "key_strategy()")] BitString),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t: PrefixTrie<u16> = PrefixTrie::new();
        let mut m: BTreeMap<BitString, u16> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(prefix, value) => {
                    let dup = m.contains_key(&prefix);
                    let res = t.insert(&prefix, value);
                    prop_assert_eq!(res.is_err(), dup);
                    if let Err(err) = res {
                        prop_assert_eq!(err.into_value(), value);
                    } else {
                        m.insert(prefix, value);
                    }
                }
                Op::Lookup(key) => {
                    prop_assert_eq!(t.longest_match(&key), model_longest_match(&m, &key));
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        let issues = t.verify_integrity();
        prop_assert!(issues.is_empty(), "{:?}", issues);

        let got: BTreeMap<BitString, u16> = t.iter().map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(got, m.clone());

        for (prefix, value) in &m {
            prop_assert_eq!(t.get_exact(prefix), Some(value));
        }
    }

    #[test]
    fn prop_order_independence(
        prefixes in prop::collection::btree_set(
            prop::collection::vec(any::<bool>(), 0..=10),
            0..=40,
        ).prop_map(|set| set.into_iter().collect::<Vec<_>>())
         .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let (ordered, shuffled) = prefixes;
        let build = |prefixes: &[Vec<bool>]| {
            let mut t = PrefixTrie::new();
            for p in prefixes {
                // Value derived from the prefix so both tries agree on it.
                let value = BitString::from_bools(p.iter().copied()).to_string();
                // Distinct prefixes never conflict, even at a fresh split point.
                t.insert(&BitString::from_bools(p.iter().copied()), value).unwrap();
            }
            t
        };
        let a = build(ordered.as_slice());
        let b = build(shuffled.as_slice());
        prop_assert_eq!(a.len(), b.len());

        for len in [0, 5, 10] {
            for key in all_keys(len) {
                prop_assert_eq!(a.longest_match(&key), b.longest_match(&key));
            }
        }
    }

    #[test]
    fn prop_common_prefix_len(
        a in bools_strategy(),
        b in bools_strategy(),
        oa in 0usize..80,
        ob in 0usize..80,
    ) {
        let ba = BitString::from_bools(a.iter().copied());
        let bb = BitString::from_bools(b.iter().copied());
        let expected = a
            .iter()
            .skip(oa)
            .zip(b.iter().skip(ob))
            .take_while(|(x, y)| x == y)
            .count();
        prop_assert_eq!(ba.common_prefix_len(oa, &bb, ob), expected);
    }

    #[test]
    fn prop_slice(a in bools_strategy(), x in 0usize..=200, y in 0usize..=200) {
        let (start, end) = (x.min(y).min(a.len()), x.max(y).min(a.len()));
        let s = BitString::from_bools(a.iter().copied()).slice(start..end);
        prop_assert_eq!(s, BitString::from_bools(a[start..end].iter().copied()));
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    // Nested prefixes, siblings and a default entry: every split shape.
    let prefixes: Vec<BitString> = ["", "1", "10", "1011", "1000", "0110", "011"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let expected: BTreeMap<BitString, usize> = prefixes.iter().cloned().zip(0..).collect();

    for_each_permutation(&prefixes, |perm| {
        let mut t = PrefixTrie::new();
        for p in &perm {
            t.insert(p, expected[p]).unwrap();
        }
        assert!(t.verify_integrity().is_empty());
        assert_eq!(t.len(), prefixes.len());

        for len in 0..=5 {
            for key in all_keys(len) {
                assert_eq!(
                    t.longest_match(&key),
                    model_longest_match(&expected, &key),
                    "key {key} after {perm:?}"
                );
            }
        }
    });
}
