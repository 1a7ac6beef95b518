// Shared with build.rs through `include!`, so this file has no `use` items
// and only depends on std.

const MONTHS: [&str; 12] = [
	"Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Same layout as the C preprocessor's `__DATE__`.
fn format_date(secs: u64) -> String {
	let (year, month, day) = civil_from_days((secs / 86_400) as i64);
	format!("{} {:>2} {}", MONTHS[(month - 1) as usize], day, year)
}

/// Same layout as the C preprocessor's `__DATE__ " " __TIME__`.
fn format_timestamp(secs: u64) -> String {
	let rem = secs % 86_400;
	format!(
		"{} {:02}:{:02}:{:02}",
		format_date(secs),
		rem / 3_600,
		(rem % 3_600) / 60,
		rem % 60
	)
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
	let z = days + 719_468;
	let era = z.div_euclid(146_097);
	let doe = z.rem_euclid(146_097);
	let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
	let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
	let mp = (5 * doy + 2) / 153;
	let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
	let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
	let year = yoe + era * 400 + i64::from(month <= 2);
	(year, month, day)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct HeaderVersion {
	text: Option<String>,
	number: Option<u64>,
	major: Option<u64>,
	minor: Option<u64>,
	patch: Option<u64>,
}

impl HeaderVersion {
	/// `OPENSSL_VERSION_NUMBER` as the headers encode it.
	///
	/// From 3.0 on the macro is an expression over MAJOR, MINOR and PATCH
	/// (`0xMNN00PP0L`, the status nibble is always zero), so it is rebuilt
	/// from those.
	fn number(&self) -> Option<u64> {
		if self.number.is_some() {
			return self.number;
		}
		match (self.major, self.minor, self.patch) {
			(Some(major), Some(minor), Some(patch)) if major >= 3 => {
				Some(major << 28 | minor << 20 | patch << 4)
			}
			_ => None,
		}
	}
}

fn strip_c_comment(value: &str) -> &str {
	match value.find("/*") {
		Some(i) => value[..i].trim_end(),
		None => value,
	}
}

fn parse_c_integer(value: &str) -> Option<u64> {
	let value = strip_c_comment(value.trim());
	let value = value.trim_end_matches(['L', 'l', 'U', 'u']);
	match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16).ok(),
		None => value.parse::<u64>().ok(),
	}
}

fn parse_c_string(value: &str) -> Option<String> {
	let value = value.trim();
	let value = value.strip_prefix('"')?;
	let end = value.find('"')?;
	Some(value[..end].to_string())
}

/// Reads the `#define`s of an `opensslv.h`.
///
/// LibreSSL defines `OPENSSL_VERSION_TEXT` as `LIBRESSL_VERSION_TEXT`, so a
/// value naming another macro is followed once.
fn parse_opensslv(contents: &str) -> HeaderVersion {
	let mut defines = std::collections::HashMap::new();
	for line in contents.lines() {
		let line = line.trim_start();
		let rest = match line.strip_prefix('#') {
			Some(r) => r.trim_start(),
			None => continue,
		};
		let rest = match rest.strip_prefix("define") {
			Some(r) => r.trim_start(),
			None => continue,
		};
		if let Some((name, value)) = rest.split_once(char::is_whitespace) {
			defines.insert(name, strip_c_comment(value.trim()));
		}
	}
	let integer = |name: &str| defines.get(name).and_then(|v| parse_c_integer(v));
	let text = defines.get("OPENSSL_VERSION_TEXT").and_then(|v| {
		parse_c_string(v).or_else(|| defines.get(v).and_then(|v| parse_c_string(v)))
	});
	HeaderVersion {
		text,
		number: integer("OPENSSL_VERSION_NUMBER"),
		major: integer("OPENSSL_VERSION_MAJOR"),
		minor: integer("OPENSSL_VERSION_MINOR"),
		patch: integer("OPENSSL_VERSION_PATCH"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const OPENSSL_3: &str = r#"
# define OPENSSL_VERSION_MAJOR  3
# define OPENSSL_VERSION_MINOR  0
# define OPENSSL_VERSION_PATCH  19
# define OPENSSL_VERSION_PRE_RELEASE ""
# define OPENSSL_VERSION_BUILD_METADATA ""
# define OPENSSL_VERSION_TEXT "OpenSSL 3.0.19 27 Jan 2026"
# define OPENSSL_VERSION_NUMBER          \
    ( (OPENSSL_VERSION_MAJOR<<28)        \
      |(OPENSSL_VERSION_MINOR<<20)       \
      |(OPENSSL_VERSION_PATCH<<4)        \
      |0x0L )
"#;

	const OPENSSL_1_1_1: &str = r#"
# define OPENSSL_VERSION_NUMBER  0x1010117fL
# ifdef OPENSSL_FIPS
#  define OPENSSL_VERSION_TEXT    "OpenSSL 1.1.1w-fips  11 Sep 2023"
# else
#  define OPENSSL_VERSION_TEXT    "OpenSSL 1.1.1w  11 Sep 2023"
# endif
"#;

	const LIBRESSL: &str = r#"
#define LIBRESSL_VERSION_NUMBER	0x3080200fL
#define LIBRESSL_VERSION_TEXT	"LibreSSL 3.8.2"

/* These will never change */
#define OPENSSL_VERSION_NUMBER	0x20000000L
#define OPENSSL_VERSION_TEXT	LIBRESSL_VERSION_TEXT
#define OPENSSL_VERSION_PTEXT	" part of " OPENSSL_VERSION_TEXT
"#;

	#[test]
	fn header_3() {
		let hv = parse_opensslv(OPENSSL_3);
		assert_eq!(hv.text.as_deref(), Some("OpenSSL 3.0.19 27 Jan 2026"));
		assert_eq!(hv.number, None);
		assert_eq!(hv.number(), Some(0x30000130));
	}

	#[test]
	fn header_1_1_1() {
		let hv = parse_opensslv(OPENSSL_1_1_1);
		assert_eq!(hv.text.as_deref(), Some("OpenSSL 1.1.1w  11 Sep 2023"));
		assert_eq!(hv.number(), Some(0x1010117f));
	}

	#[test]
	fn header_libressl() {
		let hv = parse_opensslv(LIBRESSL);
		assert_eq!(hv.text.as_deref(), Some("LibreSSL 3.8.2"));
		assert_eq!(hv.number(), Some(0x20000000));
	}

	#[test]
	fn header_missing() {
		let hv = parse_opensslv("/* nothing */\n#include <stdio.h>\n");
		assert_eq!(hv, HeaderVersion::default());
		assert_eq!(hv.number(), None);
	}

	#[test]
	fn c_integer() {
		assert_eq!(parse_c_integer("0x1010117fL"), Some(0x1010117f));
		assert_eq!(parse_c_integer("269488143"), Some(0x1010100f));
		assert_eq!(parse_c_integer("3  /* major */"), Some(3));
		assert_eq!(parse_c_integer("\\"), None);
	}

	#[test]
	fn timestamp() {
		assert_eq!(format_timestamp(0), "Jan  1 1970 00:00:00");
		assert_eq!(format_date(0), "Jan  1 1970");
		assert_eq!(format_timestamp(1_792_420_800), "Oct 19 2026 14:40:00");
		assert_eq!(format_date(951_782_400), "Feb 29 2000");
	}
}
