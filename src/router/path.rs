//! URL path normalization.

/// Returns the canonical form of a URL path.
///
/// The rules, applied left to right until nothing more can be done:
///
/// 1. Collapse repeated `/` into one.
/// 2. Drop every `.` segment.
/// 3. Drop every `..` segment together with the segment before it.
/// 4. Drop `..` segments that would climb above the root.
///
/// The result always starts with `/`. A trailing `/` survives only if the
/// input had one (a trailing `.` counts as one), and the root is always `/`.
/// The function never fails and does no I/O.
///
/// # Examples
///
/// ```
/// use radixroute::router::clean_path;
///
/// assert_eq!(clean_path("abc//def/../ghi/"), "/abc/ghi/");
/// assert_eq!(clean_path("/../../x"), "/x");
/// assert_eq!(clean_path(""), "/");
/// ```
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let p = path.as_bytes();
    let n = p.len();

    // At most one byte longer than the input (a missing leading slash).
    let mut buf = vec![0u8; n + 1];
    buf[0] = b'/';
    let mut w = 1;

    let mut r = usize::from(p[0] == b'/');
    let mut trailing = n > 1 && p[n - 1] == b'/';

    while r < n {
        match p[r] {
            b'/' => r += 1,
            b'.' if r + 1 == n => {
                trailing = true;
                r += 1;
            }
            b'.' if p[r + 1] == b'/' => r += 2,
            b'.' if p[r + 1] == b'.' && (r + 2 == n || p[r + 2] == b'/') => {
                r += 3;
                if w > 1 {
                    // backtrack to the previous separator
                    w -= 1;
                    while w > 1 && buf[w] != b'/' {
                        w -= 1;
                    }
                }
            }
            _ => {
                if w > 1 {
                    buf[w] = b'/';
                    w += 1;
                }
                while r < n && p[r] != b'/' {
                    buf[w] = p[r];
                    w += 1;
                    r += 1;
                }
            }
        }
    }

    if trailing && w > 1 {
        buf[w] = b'/';
        w += 1;
    }

    buf.truncate(w);
    String::from_utf8(buf).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
