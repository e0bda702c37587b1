extern crate prism;

use std::thread;

use prism::errors::*;
use prism::sched;
use prism::video::prelude::*;

#[test]
fn gpu_work_runs_on_the_worker_thread() {
    let (scheduler, mut worker) = sched::worker::<Device>();
    let gpu = thread::spawn(move || {
        let mut device = Device::headless();
        worker.run(&mut device);
        device.stats()
    });

    let buffer = scheduler
        .schedule(|device: &mut Device| {
            device.create_buffer(BufferParams::vertex(64, true), None)
        })
        .wait()
        .unwrap();

    let updates: Vec<_> = (0..4)
        .map(|i| {
            scheduler.schedule(move |device: &mut Device| {
                device.update_buffer(buffer, i * 16, &[i as u8; 16])
            })
        })
        .collect();

    for v in updates {
        v.wait().unwrap();
    }

    let overflow = scheduler.schedule(move |device: &mut Device| {
        device.update_buffer(buffer, 60, &[0; 8])
    });
    match overflow.wait() {
        Err(Error::BufferOverflow { capacity, .. }) => assert_eq!(capacity, 64),
        other => panic!("unexpected {:?}", other),
    }

    let pass = scheduler.schedule(|device: &mut Device| {
        let info = RenderPassInfo::new(FramebufferHandle::screen(), Viewport::with_size(8, 8));
        device.begin_render_pass(info)?;
        device.end_render_pass()
    });
    pass.wait().unwrap();

    drop(scheduler);
    assert_eq!(gpu.join().unwrap().passes, 1);
}

#[test]
fn scheduling_more_than_the_capacity_blocks_until_drained() {
    let (scheduler, mut worker) = sched::worker::<u32>();
    let producer = thread::spawn(move || {
        let promises: Vec<_> = (0..sched::CHANNEL_CAPACITY * 2)
            .map(|_| {
                scheduler.schedule(|n: &mut u32| {
                    *n += 1;
                    Ok(*n)
                })
            })
            .collect();

        promises.into_iter().map(|v| v.wait().unwrap()).last()
    });

    let mut n = 0;
    worker.run(&mut n);
    assert_eq!(n as usize, sched::CHANNEL_CAPACITY * 2);
    assert_eq!(producer.join().unwrap(), Some(n));
}
