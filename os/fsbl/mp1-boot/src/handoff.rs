//! # Control Hand-off

use mp1_memory::PhysicalAddress;

/// Transfer control to `entry` and never come back.
///
/// On ARM, a data and an instruction synchronization barrier make sure the
/// copied image is visible to instruction fetch before the branch. Caches and
/// the MMU are off at this stage, so no maintenance beyond that is needed.
///
/// # Safety
/// `entry` must be the first instruction of a loaded image that expects to be
/// entered without arguments, in the current CPU mode.
#[inline(never)]
pub unsafe fn jump_to_entry(entry: PhysicalAddress) -> ! {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!(
            "dsb sy",
            "isb sy",
            "bx {entry}",
            entry = in(reg) entry.as_u32(),
            options(noreturn)
        )
    }

    #[cfg(not(target_arch = "arm"))]
    {
        core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        // SAFETY: forwarded to the caller.
        let image_entry: extern "C" fn() -> ! = unsafe { core::mem::transmute(entry.as_usize()) };
        image_entry()
    }
}
