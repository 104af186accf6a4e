//! ISAAC stream generator with persistent, optionally encrypted state.
//!
//! The core round is Robert Jenkins's 32-bit ISAAC
//! (indirection-shift-accumulate-count), kept bit-exact so that state files
//! are portable across platforms. On top of the generator sits a state
//! lifecycle: the engine serializes its full internal state to a named file
//! through [`EncryptedBlob`], reloads it on demand, and refuses to emit
//! anything before it has been seeded or restored.

use crate::blob::EncryptedBlob;
use crate::error::{Error, Result};

/// Log2 of the state size. 2^8 = 256 words.
pub const ALPHA: usize = 8;

/// Number of 32-bit words in each of the two state arrays.
pub const N: usize = 1 << ALPHA;

/// Default state-file path when no identifier has been set.
pub const DEFAULT_STATE_PATH: &str = "./.isaacrngstate";

const GOLDEN_RATIO: u32 = 0x9e37_79b9;

/// Indirection mask: selects a word-aligned byte offset into `mem`.
const IND_MASK: usize = (N - 1) << 2;

/// Serialized form is `count results[0..N] mem[0..N] a b c`.
const STATE_WORDS: usize = 2 * N + 4;

/// The ISAAC generator plus its persistence identity (state-file path and
/// encryption key).
///
/// An initialized engine saves its state on drop; a failure in that
/// terminal save is logged, never propagated.
pub struct IsaacEngine {
    results: [u32; N],
    mem: [u32; N],
    a: u32,
    b: u32,
    c: u32,
    count: usize,
    initialized: bool,
    state_path: String,
    key: Vec<u8>,
}

impl Default for IsaacEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IsaacEngine {
    /// Create an engine with cleared state. It emits only zeros until
    /// [`seed`](Self::seed) or a successful load.
    pub fn new() -> Self {
        Self {
            results: [0; N],
            mem: [0; N],
            a: 0,
            b: 0,
            c: 0,
            count: 0,
            initialized: false,
            state_path: DEFAULT_STATE_PATH.to_string(),
            key: Vec::new(),
        }
    }

    /// Whether the engine holds a usable state.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Seed the generator.
    ///
    /// With `seed_words`, the words become the initial `results`, the three
    /// accumulators are set, and the Jenkins mixing schedule runs: the
    /// golden-ratio vector scrambled four times, two mixing passes folding
    /// the seed into `mem`, then one [`isaac_step`](Self::isaac_step) to
    /// fill the first output batch.
    ///
    /// Without `seed_words` the engine can only resume: if already
    /// initialized this is a no-op, otherwise it attempts to load from the
    /// current state file and stays uninitialized on failure.
    pub fn seed(&mut self, a: u32, b: u32, c: u32, seed_words: Option<&[u32; N]>) {
        let seed = match seed_words {
            Some(s) => s,
            None => {
                if self.initialized {
                    return;
                }
                let path = self.state_path.clone();
                let key = self.key.clone();
                if let Err(e) = self.load_from_file(&path, &key) {
                    log::debug!("state resumption failed: {e}");
                    self.initialized = false;
                }
                return;
            }
        };

        self.results = *seed;
        self.a = a;
        self.b = b;
        self.c = c;

        let mut v = [GOLDEN_RATIO; 8];
        for _ in 0..4 {
            shuffle(&mut v);
        }

        // Fold the seed into mem, then a second pass so every seed word
        // affects all of mem.
        for i in (0..N).step_by(8) {
            for j in 0..8 {
                v[j] = v[j].wrapping_add(self.results[i + j]);
            }
            shuffle(&mut v);
            self.mem[i..i + 8].copy_from_slice(&v);
        }
        for i in (0..N).step_by(8) {
            for j in 0..8 {
                v[j] = v[j].wrapping_add(self.mem[i + j]);
            }
            shuffle(&mut v);
            self.mem[i..i + 8].copy_from_slice(&v);
        }

        self.isaac_step();
        self.count = N;
        self.initialized = true;
    }

    /// Next 32-bit word. Returns 0 until the engine is seeded or restored.
    pub fn rand(&mut self) -> u32 {
        if !self.initialized {
            return 0;
        }
        if self.count == 0 {
            self.isaac_step();
            self.count = N;
        }
        self.count -= 1;
        self.results[self.count]
    }

    /// One ISAAC round: reshuffles `mem` and refills all `N` result words.
    fn isaac_step(&mut self) {
        self.c = self.c.wrapping_add(1);
        let mut a = self.a;
        let mut b = self.b.wrapping_add(self.c);

        for m in 0..N {
            let mix = match m & 3 {
                0 => a << 13,
                1 => a >> 6,
                2 => a << 2,
                _ => a >> 16,
            };
            let m2 = (m + N / 2) & (N - 1);
            let x = self.mem[m];
            a = (a ^ mix).wrapping_add(self.mem[m2]);
            let y = ind(&self.mem, x).wrapping_add(a).wrapping_add(b);
            self.mem[m] = y;
            b = ind(&self.mem, y >> ALPHA).wrapping_add(x);
            self.results[m] = b;
        }

        self.a = a;
        self.b = b;
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Set the state-file path. The supplied path is normalized: bare file
    /// names gain a `./` prefix and the final path component is truncated
    /// to 32 bytes.
    pub fn set_identifier(&mut self, path: &str) {
        self.state_path = normalize_path(path);
    }

    /// Current (normalized) state-file path.
    pub fn identifier(&self) -> &str {
        &self.state_path
    }

    /// Set the encryption key for state persistence. An empty key disables
    /// encryption.
    pub fn set_key(&mut self, key: &[u8]) {
        self.key.clear();
        self.key.extend_from_slice(key);
    }

    /// Initialize the engine from a state file.
    ///
    /// If the normalized `path`, the `key`, and an initialized state all
    /// already match the request this is a no-op; otherwise the file is
    /// loaded with the given key.
    pub fn initialize(&mut self, path: &str, key: &[u8]) -> Result<()> {
        let normalized = normalize_path(path);
        if normalized == self.state_path && key == self.key && self.initialized {
            return Ok(());
        }
        self.load_from_file(&normalized, key)
    }

    /// Serialize and write the current state through [`EncryptedBlob`].
    pub fn save(&self) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let blob = EncryptedBlob::new(self.state_path.clone());
        blob.write(self.serialize_state().as_bytes(), &self.key)
    }

    /// Save (when initialized), clear the key, reset the identifier to the
    /// default, and leave the engine uninitialized. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.initialized {
            if let Err(e) = self.save() {
                log::warn!("failed to save state during destroy: {e}");
            }
        }
        self.key.clear();
        self.state_path = DEFAULT_STATE_PATH.to_string();
        self.initialized = false;
    }

    /// Full state as whitespace-separated decimal words, each followed by
    /// a single space: `count results[0..N] mem[0..N] a b c`.
    fn serialize_state(&self) -> String {
        let mut out = String::with_capacity(STATE_WORDS * 11);
        let mut push = |w: u32| {
            out.push_str(&w.to_string());
            out.push(' ');
        };
        push(self.count as u32);
        for &w in &self.results {
            push(w);
        }
        for &w in &self.mem {
            push(w);
        }
        push(self.a);
        push(self.b);
        push(self.c);
        out
    }

    fn load_from_file(&mut self, path: &str, key: &[u8]) -> Result<()> {
        let blob = EncryptedBlob::new(path.to_string());
        let bytes = match blob.read(key) {
            Ok(b) => b,
            Err(e) => {
                self.initialized = false;
                return Err(e);
            }
        };

        match self.deserialize_state(&bytes) {
            Ok(()) => {
                self.state_path = path.to_string();
                self.set_key(key);
                self.initialized = true;
                Ok(())
            }
            Err(e) => {
                self.initialized = false;
                Err(e)
            }
        }
    }

    fn deserialize_state(&mut self, bytes: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedState("state is not ASCII text".into()))?;

        let mut words = Vec::with_capacity(STATE_WORDS);
        for token in text.split_ascii_whitespace() {
            let w: u32 = token
                .parse()
                .map_err(|_| Error::MalformedState(format!("bad token {token:?}")))?;
            words.push(w);
        }
        if words.len() < STATE_WORDS {
            return Err(Error::MalformedState(format!(
                "expected {STATE_WORDS} words, found {}",
                words.len()
            )));
        }

        let count = words[0] as usize;
        if count > N {
            return Err(Error::MalformedState(format!("count {count} out of range")));
        }

        self.count = count;
        for (i, w) in words[1..1 + N].iter().enumerate() {
            self.results[i] = *w;
        }
        for (i, w) in words[1 + N..1 + 2 * N].iter().enumerate() {
            self.mem[i] = *w;
        }
        self.a = words[1 + 2 * N];
        self.b = words[2 + 2 * N];
        self.c = words[3 + 2 * N];
        Ok(())
    }
}

impl Drop for IsaacEngine {
    fn drop(&mut self) {
        if self.initialized {
            if let Err(e) = self.save() {
                log::warn!("failed to save state on drop: {e}");
            }
        }
    }
}

/// Indirect lookup into `mem`: `x` selects a word-aligned byte offset.
#[inline]
fn ind(mem: &[u32; N], x: u32) -> u32 {
    mem[(x as usize & IND_MASK) >> 2]
}

/// Jenkins's eight-way shuffle over the mixing vector.
fn shuffle(v: &mut [u32; 8]) {
    v[0] ^= v[1] << 11;
    v[3] = v[3].wrapping_add(v[0]);
    v[1] = v[1].wrapping_add(v[2]);
    v[1] ^= v[2] >> 2;
    v[4] = v[4].wrapping_add(v[1]);
    v[2] = v[2].wrapping_add(v[3]);
    v[2] ^= v[3] << 8;
    v[5] = v[5].wrapping_add(v[2]);
    v[3] = v[3].wrapping_add(v[4]);
    v[3] ^= v[4] >> 16;
    v[6] = v[6].wrapping_add(v[3]);
    v[4] = v[4].wrapping_add(v[5]);
    v[4] ^= v[5] << 10;
    v[7] = v[7].wrapping_add(v[4]);
    v[5] = v[5].wrapping_add(v[6]);
    v[5] ^= v[6] >> 4;
    v[0] = v[0].wrapping_add(v[5]);
    v[6] = v[6].wrapping_add(v[7]);
    v[6] ^= v[7] << 8;
    v[1] = v[1].wrapping_add(v[6]);
    v[7] = v[7].wrapping_add(v[0]);
    v[7] ^= v[0] >> 9;
    v[2] = v[2].wrapping_add(v[7]);
    v[0] = v[0].wrapping_add(v[1]);
}

/// Normalize a state-file path: a bare file name gains a `./` prefix;
/// otherwise the final component (leading slash included) is truncated to
/// 32 bytes.
pub fn normalize_path(path: &str) -> String {
    match path.rfind('/') {
        None => format!("./{path}"),
        Some(pos) => {
            let (dir, file) = path.split_at(pos);
            let mut file = file.to_string();
            if file.len() > 32 {
                let mut cut = 32;
                while !file.is_char_boundary(cut) {
                    cut -= 1;
                }
                file.truncate(cut);
            }
            format!("{dir}{file}")
        }
    }
}
