use crate::*;
use num_traits::{One, Zero};

/// Default alphabet for voting, confirmation, return and finalization codes
pub const DEFAULT_CODE_ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Safe-prime group `G_q ⊂ Z_p*` of quadratic residues, with independent generators `g` and `h`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptionGroup {
    #[serde(with = "BigUintHex")]
    pub p: BigUint,
    #[serde(with = "BigUintHex")]
    pub q: BigUint,
    #[serde(with = "BigUintHex")]
    pub g: BigUint,
    #[serde(with = "BigUintHex")]
    pub h: BigUint,
}

impl EncryptionGroup {
    pub fn new(p: BigUint, q: BigUint, g: BigUint, h: BigUint) -> Result<Self, Error> {
        let group = EncryptionGroup { p, q, g, h };
        group.validate()?;
        Ok(group)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.p != &self.q * 2u32 + 1u32 {
            return Err(incompatible("p must be the safe prime 2q + 1"));
        }
        if !is_probable_prime(&self.q) || !is_probable_prime(&self.p) {
            return Err(incompatible("p and q must be prime"));
        }
        if !is_member(&self.g, self) || self.g.is_one() {
            return Err(incompatible("g must generate G_q"));
        }
        if !is_member(&self.h, self) || self.h.is_one() {
            return Err(incompatible("h must generate G_q"));
        }
        if self.g == self.h {
            return Err(incompatible("g and h must be independent"));
        }
        Ok(())
    }
}

/// Prime-order subgroup of `Z_p_circ*` used for voter identification
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdentificationGroup {
    #[serde(with = "BigUintHex")]
    pub p_circ: BigUint,
    #[serde(with = "BigUintHex")]
    pub q_circ: BigUint,
    #[serde(with = "BigUintHex")]
    pub g_circ: BigUint,
}

impl IdentificationGroup {
    pub fn new(p_circ: BigUint, q_circ: BigUint, g_circ: BigUint) -> Result<Self, Error> {
        let group = IdentificationGroup {
            p_circ,
            q_circ,
            g_circ,
        };
        group.validate()?;
        Ok(group)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !is_probable_prime(&self.p_circ) || !is_probable_prime(&self.q_circ) {
            return Err(incompatible("p_circ and q_circ must be prime"));
        }
        if !((&self.p_circ - 1u32) % &self.q_circ).is_zero() {
            return Err(incompatible("q_circ must divide p_circ - 1"));
        }
        if self.g_circ.is_one() || !is_identification_member(&self.g_circ, self) {
            return Err(incompatible("g_circ must generate the order-q_circ subgroup"));
        }
        Ok(())
    }
}

/// Prime field `Z_p'` for polynomial secret sharing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PrimeField {
    #[serde(with = "BigUintHex")]
    pub p_prime: BigUint,
}

impl PrimeField {
    pub fn new(p_prime: BigUint) -> Result<Self, Error> {
        let field = PrimeField { p_prime };
        field.validate()?;
        Ok(field)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !is_probable_prime(&self.p_prime) {
            return Err(incompatible("p_prime must be prime"));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SecurityParameters {
    /// Privacy security level in bits
    pub lambda: usize,

    /// Integrity security level in bits
    pub mu: usize,

    /// Hash output length in bits
    pub l: usize,

    /// Deterrence factor
    pub epsilon: f64,
}

impl SecurityParameters {
    pub fn new(lambda: usize, mu: usize, l: usize, epsilon: f64) -> Result<Self, Error> {
        let security = SecurityParameters {
            lambda,
            mu,
            l,
            epsilon,
        };
        security.validate()?;
        Ok(security)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.lambda == 0 || self.mu == 0 {
            return Err(incompatible("security levels must be positive"));
        }
        if self.l % 8 != 0 || self.l < 2 * self.mu || self.l > 512 {
            return Err(incompatible("hash length must be a multiple of 8 in [2mu, 512]"));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(incompatible("epsilon must be in (0, 1)"));
        }
        Ok(())
    }
}

/// Everything the protocol parties agree on before an election starts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PublicParameters {
    pub security: SecurityParameters,
    pub encryption_group: EncryptionGroup,
    pub identification_group: IdentificationGroup,
    pub prime_field: PrimeField,

    /// Bit length of the voting credential
    pub l_x: usize,

    /// Bit length of the confirmation credential
    pub l_y: usize,

    /// Bit length of a return code
    pub l_r: usize,

    /// Bit length of a finalization code
    pub l_f: usize,

    /// Bit length of an OT message (one encoded point)
    pub l_m: usize,

    /// Number of authorities
    pub s: usize,

    pub code_alphabet: String,
}

/// Bit lengths of the voting, confirmation, return and finalization codes and of the OT messages
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodeLengths {
    pub l_x: usize,
    pub l_y: usize,
    pub l_r: usize,
    pub l_f: usize,
    pub l_m: usize,
}

impl PublicParameters {
    /// Validate the combination of parameters
    pub fn validate(&self) -> Result<(), Error> {
        self.security.validate()?;
        self.encryption_group.validate()?;
        self.identification_group.validate()?;
        self.prime_field.validate()?;

        let q_circ = &self.identification_group.q_circ;

        if (self.encryption_group.q.bits() as usize) < 2 * self.security.lambda {
            return Err(incompatible("q is too small for lambda"));
        }
        if (q_circ.bits() as usize) < 2 * self.security.mu {
            return Err(incompatible("q_circ is too small for mu"));
        }
        if (self.prime_field.p_prime.bits() as usize) < 2 * self.security.mu {
            return Err(incompatible("p_prime is too small for mu"));
        }
        if self.s == 0 {
            return Err(incompatible("at least one authority is required"));
        }

        // Summed credentials must not wrap modulo q_circ
        let s = BigUint::from(self.s);
        if &s << self.l_x > *q_circ || &s << self.l_y > *q_circ {
            return Err(incompatible("s * 2^l_x and s * 2^l_y must not exceed q_circ"));
        }

        for (name, bits) in [("l_r", self.l_r), ("l_f", self.l_f)].iter() {
            if *bits == 0 || bits % 8 != 0 || *bits > self.security.l {
                return Err(Error::IncompatibleParameters(format!(
                    "{} must be a multiple of 8 in [8, l]",
                    name
                )));
            }
        }

        let field_bytes = (self.prime_field.p_prime.bits() as usize + 7) / 8;
        if self.l_m != 16 * field_bytes {
            return Err(incompatible("l_m must hold two prime field elements"));
        }
        if self.l_m / 8 > 255 * 64 {
            return Err(incompatible("l_m exceeds the mask expansion limit"));
        }

        let alphabet = self.alphabet();
        if alphabet.len() < 2 {
            return Err(incompatible("code alphabet needs at least two characters"));
        }
        let mut sorted = alphabet.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != alphabet.len() {
            return Err(incompatible("code alphabet characters must be distinct"));
        }

        Ok(())
    }

    /// Assemble a parameter set, rejecting incompatible combinations
    pub fn new(
        security: SecurityParameters,
        encryption_group: EncryptionGroup,
        identification_group: IdentificationGroup,
        prime_field: PrimeField,
        lengths: CodeLengths,
        s: usize,
        code_alphabet: &str,
    ) -> Result<Self, Error> {
        let params = PublicParameters {
            security,
            encryption_group,
            identification_group,
            prime_field,
            l_x: lengths.l_x,
            l_y: lengths.l_y,
            l_r: lengths.l_r,
            l_f: lengths.l_f,
            l_m: lengths.l_m,
            s,
            code_alphabet: code_alphabet.to_owned(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Deserialize from JSON and validate
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let params: PublicParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Small parameters for tests and simulations.
    ///
    /// These parameters offer no security: the encryption group has a 128-bit safe prime
    /// and the identification group a 96-bit order.
    pub fn testing(s: usize) -> Result<Self, Error> {
        let encryption_group = EncryptionGroup::new(
            hex_int("ffffffffffffffffffffffffffffc3a7"),
            hex_int("7fffffffffffffffffffffffffffe1d3"),
            BigUint::from(4u32),
            BigUint::from(9u32),
        )?;
        let identification_group = IdentificationGroup::new(
            hex_int("100000007ffffffffffffffeeffffff79"),
            hex_int("ffffffffffffffffffffffef"),
            hex_int("4594cff6c16fe3dee4e00bd2e0d060fd"),
        )?;
        let prime_field = PrimeField::new(hex_int("ffffffffffffffc5"))?;

        PublicParameters::new(
            SecurityParameters::new(32, 32, 256, 0.999)?,
            encryption_group,
            identification_group,
            prime_field,
            CodeLengths {
                l_x: 64,
                l_y: 64,
                l_r: 16,
                l_f: 16,
                l_m: 128,
            },
            s,
            DEFAULT_CODE_ALPHABET,
        )
    }

    pub fn alphabet(&self) -> Vec<char> {
        self.code_alphabet.chars().collect()
    }

    /// Hash output length in bytes
    pub fn hash_length(&self) -> usize {
        self.security.l / 8
    }

    /// Upper bound (exclusive) of a single authority's voting credential
    pub fn q_x(&self) -> BigUint {
        BigUint::one() << self.l_x
    }

    /// Upper bound (exclusive) of a single authority's confirmation credential
    pub fn q_y(&self) -> BigUint {
        BigUint::one() << self.l_y
    }

    pub fn return_code_length(&self) -> usize {
        self.l_r / 8
    }

    pub fn finalization_code_length(&self) -> usize {
        self.l_f / 8
    }

    /// Length in bytes of one OT message
    pub fn point_message_length(&self) -> usize {
        self.l_m / 8
    }

    /// Number of characters in a voting code
    pub fn voting_code_length(&self) -> usize {
        code_length(&(BigUint::from(self.s) << self.l_x), self.code_alphabet.chars().count())
    }

    /// Number of characters in a confirmation code
    pub fn confirmation_code_length(&self) -> usize {
        code_length(&(BigUint::from(self.s) << self.l_y), self.code_alphabet.chars().count())
    }

    /// Modulus for challenges of proofs that span both groups
    pub fn challenge_modulus(&self) -> &BigUint {
        let q = &self.encryption_group.q;
        let q_circ = &self.identification_group.q_circ;
        if q < q_circ {
            q
        } else {
            q_circ
        }
    }
}

fn incompatible(reason: &str) -> Error {
    Error::IncompatibleParameters(reason.to_owned())
}

fn hex_int(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).unwrap_or_default()
}
