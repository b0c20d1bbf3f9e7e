/// Smallest `2^a 3^b 5^c` not below `n`, the sizes the transforms are fastest on.
pub fn optimal_dft_size(n: usize) -> usize {
    /// Doubles `x` until it reaches `n`.
    fn reach(mut x: usize, n: usize) -> Option<usize> {
        while x < n {
            x = x.checked_mul(2)?;
        }
        Some(x)
    }

    let mut best = usize::MAX;
    let mut p5 = 1usize;
    loop {
        let mut p35 = p5;
        loop {
            if let Some(x) = reach(p35, n) {
                best = best.min(x)
            }
            match p35.checked_mul(3) {
                Some(next) if p35 < n => p35 = next,
                _ => break,
            }
        }
        match p5.checked_mul(5) {
            Some(next) if p5 < n => p5 = next,
            _ => break,
        }
    }
    best
}

#[inline]
pub fn is_5_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for p in [2, 3, 5] {
        while n % p == 0 {
            n /= p
        }
    }
    n == 1
}

#[test]
fn test_known() {
    assert_eq!(optimal_dft_size(1), 1);
    assert_eq!(optimal_dft_size(7), 8);
    assert_eq!(optimal_dft_size(97), 100);
    assert_eq!(optimal_dft_size(1000), 1000);
    assert_eq!(optimal_dft_size(1001), 1024);
    assert_eq!(optimal_dft_size(4096), 4096);
    assert_eq!(optimal_dft_size(4097), 4320);
}

#[test]
fn test_smallest() {
    for n in 1..5000 {
        let m = optimal_dft_size(n);
        assert!(m >= n);
        assert!(is_5_smooth(m), "{m}");
        assert!((n..m).all(|k| !is_5_smooth(k)), "{n} -> {m}");
    }
}
