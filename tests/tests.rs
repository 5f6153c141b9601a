// Harness running the integration tests against the built binary
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

pub const TESTS_BINARY: &str = env!("CARGO_BIN_EXE_sed");

// Point uutests at the single-call binary before any test runs
#[ctor::ctor]
fn init() {
    unsafe {
        std::env::set_var("UUTESTS_BINARY_PATH", TESTS_BINARY);
        // For single-call binaries, tell uutests not to auto-add the utility name
        std::env::set_var("UUTESTS_UTIL_NAME", "");
        std::env::set_var("UUTILS_MULTICALL", "0");
    }
}

#[cfg(feature = "sed")]
#[path = "by-util/test_sed.rs"]
mod test_sed;
