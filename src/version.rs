use nom::bytes::complete::take_while1;
use nom::character::complete::{alpha1, char, digit1, satisfy, space1};
use nom::combinator::{map_res, opt};
use nom::sequence::preceded;
use nom::IResult;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpenSslVersion {
	pub major: u8,
	pub minor: u8,
	pub patch: u8,
	pub letter: Option<char>,
}

impl OpenSslVersion {
	/// Decodes an `OPENSSL_VERSION_NUMBER`.
	///
	/// Before 3.0 the layout is `0xMNNFFPPS` (PP is the patch letter), from
	/// 3.0 on it is `0xMNN00PP0`.
	pub fn from_number(n: u64) -> Self {
		let major = get_openssl_version_unit(n, 0) as u8;
		let minor = get_openssl_version_unit(n, 1) as u8;
		if major >= 3 {
			return Self {
				major,
				minor,
				patch: get_openssl_version_unit(n, 3) as u8,
				letter: None,
			};
		}
		let p = get_openssl_version_unit(n, 3);
		let letter = if p != 0 {
			std::char::from_u32((p + 0x60) as u32)
		} else {
			None
		};
		Self {
			major,
			minor,
			patch: get_openssl_version_unit(n, 2) as u8,
			letter,
		}
	}

	/// Whether a program built against `self` may run against `other`.
	pub fn is_abi_compatible(&self, other: &Self) -> bool {
		if self.major != other.major {
			return false;
		}
		self.major >= 3 || self.minor == other.minor
	}
}

fn get_openssl_version_unit(n: u64, pos: u32) -> u64 {
	let p = 0x000f_f000_0000 >> (8 * pos);
	let n = n & p;
	n >> (8 * (3 - pos) + 4)
}

impl fmt::Display for OpenSslVersion {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
		if let Some(l) = self.letter {
			write!(f, "{l}")?;
		}
		Ok(())
	}
}

impl Serialize for OpenSslVersion {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// A version string such as `OpenSSL 1.1.1w  11 Sep 2023`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VersionText {
	pub flavor: String,
	pub version: OpenSslVersion,
	pub suffix: Option<String>,
}

impl VersionText {
	pub fn parse(s: &str) -> Option<Self> {
		parse_version_text(s.trim_start()).ok().map(|(_, v)| v)
	}
}

fn parse_u8(input: &str) -> IResult<&str, u8> {
	map_res(digit1, |s: &str| s.parse::<u8>())(input)
}

fn parse_version_text(input: &str) -> IResult<&str, VersionText> {
	let (input, flavor) = alpha1(input)?;
	let (input, _) = space1(input)?;
	let (input, major) = parse_u8(input)?;
	let (input, _) = char('.')(input)?;
	let (input, minor) = parse_u8(input)?;
	let (input, _) = char('.')(input)?;
	let (input, patch) = parse_u8(input)?;
	let (input, letter) = opt(satisfy(|c| c.is_ascii_lowercase()))(input)?;
	let (input, suffix) = opt(preceded(
		char('-'),
		take_while1(|c: char| !c.is_whitespace()),
	))(input)?;
	let text = VersionText {
		flavor: flavor.to_string(),
		version: OpenSslVersion {
			major,
			minor,
			patch,
			letter,
		},
		suffix: suffix.map(str::to_string),
	};
	Ok((input, text))
}

impl fmt::Display for VersionText {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} {}", self.flavor, self.version)?;
		if let Some(ref s) = self.suffix {
			write!(f, "-{s}")?;
		}
		Ok(())
	}
}

/// The best known version of a library, with its flavor when the version
/// string could be parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionInfo {
	pub flavor: Option<String>,
	pub version: OpenSslVersion,
}

impl VersionInfo {
	/// Prefers the version string over the number: LibreSSL always reports
	/// `0x20000000`. A number of 0 means unknown.
	pub fn detect(number: u64, text: Option<&str>) -> Option<Self> {
		if let Some(t) = text.and_then(VersionText::parse) {
			return Some(Self {
				flavor: Some(t.flavor),
				version: t.version,
			});
		}
		(number != 0).then(|| Self {
			flavor: None,
			version: OpenSslVersion::from_number(number),
		})
	}

	/// Compares `self`, taken from the headers, with the runtime library.
	pub fn skew_with(&self, runtime: &Self) -> Option<VersionSkew> {
		let other_flavor = match (&self.flavor, &runtime.flavor) {
			(Some(h), Some(r)) => h != r,
			_ => false,
		};
		if !other_flavor && self.version.is_abi_compatible(&runtime.version) {
			return None;
		}
		Some(VersionSkew {
			header: self.clone(),
			runtime: runtime.clone(),
		})
	}
}

impl fmt::Display for VersionInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if let Some(ref flavor) = self.flavor {
			write!(f, "{flavor} ")?;
		}
		write!(f, "{}", self.version)
	}
}

impl Serialize for VersionInfo {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Header and runtime versions that are not ABI compatible.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VersionSkew {
	pub header: VersionInfo,
	pub runtime: VersionInfo,
}

impl fmt::Display for VersionSkew {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"built against {} but running with {}",
			self.header, self.runtime
		)
	}
}

/// Compares the header and runtime version numbers; 0 means unknown.
pub fn detect_skew(header: u64, runtime: u64) -> Option<VersionSkew> {
	let header = VersionInfo::detect(header, None)?;
	let runtime = VersionInfo::detect(runtime, None)?;
	header.skew_with(&runtime)
}
