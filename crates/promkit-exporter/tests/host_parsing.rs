#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promkit_exporter::host::cpu::{parse_cpu_times, usage_percent, CpuTimes};
use promkit_exporter::host::disk::parse_diskstats;
use promkit_exporter::host::memory::parse_meminfo;
use promkit_exporter::host::network::parse_net_dev;
use promkit_exporter::host::process::{parse_max_fds, parse_process_stat, parse_uptime};
use promkit_exporter::host::procs::{is_pid_dir, parse_procs_running};

const STAT: &str = "\
cpu  100 0 50 800 50 0 0 0 0 0
cpu0 50 0 25 400 25 0 0 0 0 0
intr 12345
procs_running 3
procs_blocked 0
";

#[test]
fn cpu_times_and_usage() {
    let first = parse_cpu_times(STAT).unwrap();
    assert_eq!(first, CpuTimes { idle: 850, total: 1000 });

    let later = CpuTimes { idle: 900, total: 1200 };
    assert_eq!(usage_percent(first, later), Some(75.0));
    assert_eq!(usage_percent(later, later), None);
    assert_eq!(usage_percent(CpuTimes::default(), first), Some(15.0));
}

#[test]
fn cpu_line_must_be_complete() {
    assert!(parse_cpu_times("cpu  1 2 3\n").is_err());
    assert!(parse_cpu_times("intr 1\n").is_err());
}

#[test]
fn meminfo() {
    let text = "\
MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    4000000 kB
Buffers:          100000 kB
";
    let info = parse_meminfo(text).unwrap();
    assert_eq!(info.total_kb, 16_000_000);
    assert_eq!(info.available_kb, 4_000_000);
    assert_eq!(info.used_kb(), 12_000_000);
    assert_eq!(info.usage_percent(), 75.0);

    assert!(parse_meminfo("MemTotal: 10 kB\n").is_err());
}

#[test]
fn diskstats_for_one_device() {
    let text = "\
   8       0 sda 1000 10 8000 400 500 20 6000 300 0 700 700
   8       1 sda1 900 5 7000 350 400 10 5000 250 0 600 600
 259       0 nvme0n1 1 0 0 0 0 0 0 0 0 0 0
";
    let sda = parse_diskstats(text, "sda").unwrap();
    assert_eq!(sda.sectors_read, 8000);
    assert_eq!(sda.read_ms, 400);
    assert_eq!(sda.sectors_written, 6000);
    assert_eq!(sda.write_ms, 300);
    assert_eq!(sda.read_rate(), 20.0);
    assert_eq!(sda.write_rate(), 20.0);

    let idle = parse_diskstats(text, "nvme0n1").unwrap();
    assert_eq!(idle.read_rate(), 0.0);

    assert!(parse_diskstats(text, "sdb").is_err());
}

#[test]
fn net_dev_filters_by_prefix() {
    let text = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 5000      50    0    0    0     0          0         0     5000      50    0    0    0     0       0          0
enp3s0: 123456   1000    2    3    0     0          0         0   654321     900    4    5    0     0       0          0
";
    let stats = parse_net_dev(text, "en").unwrap();
    assert_eq!(stats.len(), 1);
    let s = &stats[0];
    assert_eq!(s.interface, "enp3s0");
    assert_eq!((s.rx_bytes, s.rx_errors, s.rx_drops), (123_456, 2, 3));
    assert_eq!((s.tx_bytes, s.tx_errors, s.tx_drops), (654_321, 4, 5));

    assert_eq!(parse_net_dev(text, "").unwrap().len(), 2);
    assert!(parse_net_dev(text, "wl").is_err());
}

#[test]
fn procs() {
    assert_eq!(parse_procs_running(STAT).unwrap(), 3);
    assert!(parse_procs_running("cpu 1\n").is_err());
    assert!(is_pid_dir("1234"));
    assert!(!is_pid_dir("self"));
    assert!(!is_pid_dir(""));
}

#[test]
fn process_stat_with_awkward_command_name() {
    let stat = "4242 (my (odd) prog) S 1 4242 4242 0 -1 4194560 120 0 7 0 250 130 0 0 20 0 6 0 5000 104857600 2560 18446744073709551615";
    let s = parse_process_stat(stat).unwrap();
    assert_eq!(s.minflt, 120);
    assert_eq!(s.majflt, 7);
    assert_eq!(s.utime, 250);
    assert_eq!(s.stime, 130);
    assert_eq!(s.num_threads, 6);
    assert_eq!(s.starttime, 5000);
    assert_eq!(s.vsize, 104_857_600);
    assert_eq!(s.rss, 2560);

    assert!(parse_process_stat("4242 (short) S 1 2").is_err());
}

#[test]
fn limits_and_uptime() {
    let limits = "\
Limit                     Soft Limit           Hard Limit           Units
Max cpu time              unlimited            unlimited            seconds
Max open files            1024                 524288               files
";
    assert_eq!(parse_max_fds(limits).unwrap(), 1024.0);
    let unlimited = "Max open files            unlimited            unlimited            files\n";
    assert_eq!(parse_max_fds(unlimited).unwrap(), f64::INFINITY);
    assert!(parse_max_fds("Max processes 10 10 processes\n").is_err());

    assert_eq!(parse_uptime("12345.67 54321.00\n").unwrap(), 12345.67);
    assert!(parse_uptime("").is_err());
}
