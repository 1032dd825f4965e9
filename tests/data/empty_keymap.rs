// Code generated by keystore-keygen.  DO NOT EDIT!
//
// Regenerate it using `keystore-keygen generate`.

#[allow(non_upper_case_globals, dead_code)] mod keymap {
    pub struct KeyDetails {
        pub fingerprint: &'static str,
        pub armored_public_key: &'static str,
        pub armored_private_key: &'static str,
    }

    pub const keys: &[(&str, KeyDetails)] = &[
    ];

    pub fn get(name: &str) -> Option<&'static KeyDetails> {
        keys.iter().find(|(n, _)| *n == name).map(|(_, k)| k)
    }
}
