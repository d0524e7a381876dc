//! Property-based tests for batch partitioning and the joint shuffle

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use turnout::batch::{batch_count, partition, shuffle_together};

fn params() -> impl Strategy<Value = (usize, usize, usize)> {
    (0usize..500, 1usize..40).prop_flat_map(|(n, size)| (Just(n), Just(size), 0..size))
}

proptest! {
    #[test]
    fn batches_tile_the_records_exactly((n, size, fudge) in params()) {
        let batches = partition(n, size, fudge).unwrap();

        prop_assert_eq!(batches.len(), batch_count(n, size, fudge));
        prop_assert_eq!(batches.iter().map(|b| b.length).sum::<usize>(), n);

        let mut next = 0;
        for (i, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, i);
            prop_assert_eq!(batch.offset, next);
            prop_assert!(batch.length > 0);
            next += batch.length;
        }
    }

    #[test]
    fn only_the_last_batch_differs_from_size((n, size, fudge) in params()) {
        let batches = partition(n, size, fudge).unwrap();
        if let Some((last, rest)) = batches.split_last() {
            prop_assert!(rest.iter().all(|b| b.length == size));
            prop_assert!(last.length <= size + fudge);
            if last.length < size {
                // A short tail survives only when too long to fold, or when it is everything.
                prop_assert!(batches.len() == 1 || last.length > fudge);
            }
        }
    }

    #[test]
    fn joint_shuffle_keeps_rows_together(len in 0usize..200, seed in any::<u64>()) {
        let names: Vec<String> = (0..len).map(|i| format!("n{}", i)).collect();
        let phones: Vec<String> = (0..len).map(|i| format!("p{}", i)).collect();
        let mut rng = StdRng::seed_from_u64(seed);

        let shuffled = shuffle_together(vec![names.clone(), phones], &mut rng).unwrap();

        let mut seen = shuffled[0].clone();
        for (name, phone) in shuffled[0].iter().zip(&shuffled[1]) {
            prop_assert_eq!(&name[1..], &phone[1..]);
        }
        seen.sort();
        let mut expected = names;
        expected.sort();
        prop_assert_eq!(seen, expected);
    }
}
