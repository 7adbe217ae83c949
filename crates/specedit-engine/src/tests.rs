//! Shared fixtures for unit tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// The smallest spec with a preamble, a description and a changelog.
pub const SAMPLE_SPEC: &str = "Name: foo
Version: 1.0
%description
Hello
%changelog
* Mon Jan 01 2024 A B <a@example.com> - 1.0-1
- initial
";

/// A spec with two subpackages and dependencies in each.
pub const MULTI_PACKAGE_SPEC: &str = "Name: foo
Version: 2.0
Release: 1
License: MIT
BuildRequires: gcc
BuildRequires: make
Requires: bash
Provides: foo-bin = 2.0

%description
Main package.

%package devel
Summary: Headers
Requires: foo = 2.0
Provides: foo-headers

%description devel
Development files.

%package -n libfoo
Summary: Library
Requires(post): /sbin/ldconfig

%description -n libfoo
Shared library.

%prep
%autosetup

%build
%make_build

%install
%make_install

%files
/usr/bin/foo

%files devel
/usr/include/foo.h

%files -n libfoo
/usr/lib/libfoo.so.*

%changelog
* Tue Feb 06 2024 Jane Doe <jane@example.com> - 2.0-1
- Update to 2.0

* Mon Jan 01 2024 Jane Doe <jane@example.com> - 1.0-1
- Initial package
";

pub fn create_test_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_spec(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
