//! Zeroizing wrappers for derived keys and decrypted configuration bytes.
//!
//! - [`SecretBytes`]: fixed-size key material (the 32-byte derived key)
//! - [`SecretBuffer`]: variable-length plaintext returned by the cipher
//!
//! Both wipe their contents on drop, mask `Debug`/`Display`, and make a
//! best-effort attempt to `mlock` the backing memory so it stays out of swap.

use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Page locking
// ---------------------------------------------------------------------------

/// Best-effort `mlock` guard. Unlocks on drop if the lock succeeded.
struct PageLock {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: the pointer is only handed to mlock/munlock and never dereferenced.
unsafe impl Send for PageLock {}
unsafe impl Sync for PageLock {}

impl PageLock {
    const fn none() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            locked: false,
        }
    }

    fn acquire(ptr: *const u8, len: usize) -> Self {
        let locked = platform::lock(ptr, len);
        if !locked && len > 0 {
            static WARNED: std::sync::Once = std::sync::Once::new();
            WARNED.call_once(|| {
                tracing::warn!(
                    "mlock failed, key material may be swapped to disk \
                     (consider raising RLIMIT_MEMLOCK)"
                );
            });
        }
        Self { ptr, len, locked }
    }
}

impl Drop for PageLock {
    fn drop(&mut self) {
        if self.locked {
            platform::unlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer
// ---------------------------------------------------------------------------

/// Heap buffer for decrypted payloads. Zeroized on drop.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    _lock: PageLock,
}

impl SecretBuffer {
    /// Copy `data` into a fresh locked allocation.
    ///
    /// The caller still owns `data` and should wipe it afterwards.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        let inner: SecretSlice<u8> = data.to_vec().into();
        let exposed = inner.expose_secret();
        let lock = PageLock::acquire(exposed.as_ptr(), exposed.len());
        Self { inner, _lock: lock }
    }

    /// Borrow the plaintext bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecretBytes<N>
// ---------------------------------------------------------------------------

/// Fixed-size secret, e.g. the 32-byte key produced by [`crate::kdf::derive_key`].
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
    #[zeroize(skip)]
    lock: PageLock,
}

impl<const N: usize> SecretBytes<N> {
    /// Take ownership of `data`.
    ///
    /// The lock covers the address at construction time. A later move leaves
    /// it pointing at a stale address, which makes `munlock` a harmless no-op;
    /// zeroize-on-drop does not depend on it.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut s = Self {
            bytes: data,
            lock: PageLock::none(),
        };
        s.lock = PageLock::acquire(s.bytes.as_ptr(), N);
        s
    }

    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    pub(super) fn lock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock only inspects the address range; an invalid range
        // makes the kernel return an error, which we treat as "not locked".
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn unlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: as above; failure is ignored.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }
}

#[cfg(not(unix))]
mod platform {
    pub(super) const fn lock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) const fn unlock(_ptr: *const u8, _len: usize) {}
}
