//! Pre-built mock hosts for testing.
//!
//! These scenarios provide realistic command output for exercising the
//! collector end to end.

use super::runner::MockRunner;
use crate::collector::commands;
use std::time::Duration;

impl MockRunner {
    /// A small Ubuntu web server.
    ///
    /// Includes: loopback, one NIC and a docker bridge; two human accounts;
    /// a root disk, an NVMe data disk, an LVM volume plus loop/overlay noise;
    /// `ssh` running, `cron` stopped and no `docker` unit.
    pub fn typical_host() -> Self {
        let mut runner = Self::new();

        runner.add(commands::HOSTNAME, "web-01\n");
        runner.add(commands::DISTRIBUTION, "Ubuntu 22.04.4 LTS\n");
        runner.add(commands::KERNEL, "5.15.0-105-generic\n");

        runner.add(commands::UPTIME_PRETTY, "up 3 days, 4 hours, 5 minutes\n");
        runner.add(
            commands::UPTIME,
            " 10:15:01 up 3 days,  4:05,  2 users,  load average: 0.15, 0.10, 0.05\n",
        );
        runner.add(
            commands::FREE,
            "\
               total        used        free      shared  buff/cache   available
Mem:            15Gi       3.5Gi        10Gi       0.3Gi       1.9Gi        11Gi
Swap:          2.0Gi          0B       2.0Gi
",
        );

        runner.add(
            commands::IP_ADDR,
            r"1: lo    inet 127.0.0.1/8 scope host lo\       valid_lft forever preferred_lft forever
1: lo    inet6 ::1/128 scope host \       valid_lft forever preferred_lft forever
2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0\       valid_lft forever preferred_lft forever
2: eth0    inet6 fe80::5054:ff:fe12:3456/64 scope link \       valid_lft forever preferred_lft forever
3: docker0    inet 172.17.0.1/16 brd 172.17.255.255 scope global docker0\       valid_lft forever preferred_lft forever
",
        );
        runner.add(
            commands::IP_LINK,
            r"1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN mode DEFAULT group default qlen 1000\    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP mode DEFAULT group default qlen 1000\    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
3: docker0: <NO-CARRIER,BROADCAST,MULTICAST,UP> mtu 1500 qdisc noqueue state DOWN mode DEFAULT group default \    link/ether 02:42:8f:11:22:33 brd ff:ff:ff:ff:ff:ff
4: wlan0: <BROADCAST,MULTICAST> mtu 1500 qdisc noop state DOWN mode DEFAULT group default qlen 1000\    link/ether 9c:b6:d0:aa:bb:cc brd ff:ff:ff:ff:ff:ff
",
        );

        runner.add(
            commands::PASSWD,
            "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
www-data:x:33:33:www-data:/var/www:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
alice:x:1000:1000:Alice,,,:/home/alice:/bin/bash
bob:x:1001:1001:Bob,,,:/home/bob:/bin/zsh
",
        );
        runner.add(
            commands::WHO,
            "\
alice    pts/0        2024-05-01 09:12 (10.0.0.2)
bob      tty1         2024-05-01 08:00
alice    pts/1        2024-05-01 09:30 (10.0.0.2)
",
        );

        runner.add(
            commands::DF,
            "\
Filesystem           Size  Used Avail Use% Mounted on
udev                 7.8G     0  7.8G   0% /dev
tmpfs                1.6G  2.1M  1.6G   1% /run
/dev/sda1             50G   10G   40G  20% /
/dev/nvme0n1p2       227G  109G  107G  51% /srv
/dev/loop0            64M   64M     0 100% /snap/core20/2105
overlay               50G   10G   40G  20% /var/lib/docker/overlay2/3f1a/merged
/dev/mapper/vg-data  100G   25G   75G  25% /data
",
        );

        runner.add(
            commands::PS_BY_CPU,
            "\
    PID USER     COMMAND         %CPU %MEM
   1234 mysql    mysqld          12.5  8.1
    987 www-data php-fpm8.1       5.0  1.2
   2222 alice    Web Content      1.0  6.3
      1 root     systemd          0.1  0.3
",
        );
        runner.add(
            commands::PS_BY_MEM,
            "\
    PID USER     COMMAND         %CPU %MEM
   1234 mysql    mysqld          12.5  8.1
   2222 alice    Web Content      1.0  6.3
    987 www-data php-fpm8.1       5.0  1.2
      1 root     systemd          0.1  0.3
",
        );

        runner.add(
            commands::nethogs(Duration::from_secs(3)),
            "\
Adding local address: 10.0.0.5
Refreshing:
/usr/sbin/sshd/812/0\t0.618\t0.228
/usr/bin/curl/4321/1000\t6.1\t120.4
Refreshing:
/usr/sbin/sshd/812/0\t1.234\t0.456
/usr/bin/curl/4321/1000\t12.5\t250.75
unknown TCP/0/0\t0\t0
",
        );

        runner.add(
            commands::unit_files("ssh.service"),
            "ssh.service enabled enabled\n",
        );
        runner.add(commands::is_active("ssh"), "active\n");
        runner.add(commands::is_enabled("ssh"), "enabled\n");
        runner.add(
            commands::unit_files("cron.service"),
            "cron.service disabled enabled\n",
        );
        runner.add(commands::is_active("cron"), "inactive\n");
        runner.add(commands::is_enabled("cron"), "disabled\n");
        runner.add(commands::unit_files("docker.service"), "");

        runner.add(commands::EFFECTIVE_UID, "0\n");

        runner
    }

    /// A host that only answers identity commands; every other tool is missing.
    pub fn identity_only() -> Self {
        Self::new()
            .with(commands::HOSTNAME, "h\n")
            .with(commands::DISTRIBUTION, "Debian GNU/Linux 12 (bookworm)\n")
            .with(commands::KERNEL, "6.1.0-18-amd64\n")
    }
}
