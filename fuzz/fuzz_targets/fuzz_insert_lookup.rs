#![no_main]
use ipmap::IpMap;
use libfuzzer_sys::fuzz_target;
use std::net::Ipv4Addr;

fuzz_target!(|data: &[u8]| {
    let mut map = IpMap::new();
    let _ = map.insert("1.2.3.4", 0u8);
    let _ = map.insert("10.0.0.0/8", 1);
    let _ = map.insert("192.168.0.0/16", 2);

    // A rejected key must leave the map untouched
    let before = map.len();
    if map.insert_bytes(data, 3).is_err() {
        assert_eq!(map.len(), before);
    }

    // Lookups only succeed for bare IPv4 addresses
    if let Ok(text) = std::str::from_utf8(data) {
        let result = map.lookup(text);
        assert_eq!(result.is_ok(), text.parse::<Ipv4Addr>().is_ok());
        if let Ok(addr) = text.parse::<Ipv4Addr>() {
            assert_eq!(map.lookup_addr(addr), map.lookup(text).ok().flatten());
        }
    }
});
