use std::ops::Range;

/// Splits `nkpt` k-points into `nrank` contiguous chunks whose sizes differ
/// by at most one. Ranks beyond `nkpt` get an empty range.
pub fn get_chunks(nkpt: usize, nrank: usize) -> Vec<Range<usize>> {
    assert!(nrank > 0);

    let mut vchunks_size = vec![0; nrank];
    for ik in 0..nkpt {
        vchunks_size[ik % nrank] += 1;
    }

    let mut vchunks = Vec::with_capacity(nrank);

    let mut n = 0;
    for size in vchunks_size {
        vchunks.push(n..n + size);
        n += size;
    }

    vchunks
}

pub fn get_k_range(nkpt: usize, nrank: usize, rank: usize) -> Range<usize> {
    get_chunks(nkpt, nrank)[rank].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpts_distribution_covers_every_kpoint_once() {
        let nrank = 5;
        let nkpt = 31;

        let chunks = get_chunks(nkpt, nrank);

        assert_eq!(chunks.first().unwrap().start, 0);
        assert_eq!(chunks.last().unwrap().end, nkpt);

        for w in chunks.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }

        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![7, 6, 6, 6, 6]);
    }

    #[test]
    fn test_kpts_distribution_more_ranks_than_kpoints() {
        assert_eq!(get_k_range(2, 4, 0), 0..1);
        assert_eq!(get_k_range(2, 4, 1), 1..2);
        assert!(get_k_range(2, 4, 3).is_empty());
    }
}
